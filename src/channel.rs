//! Channel records and the derived display list.
//!
//! A channel is read-only to everything in this crate except the store. The
//! grid never holds the raw collection in display order; it derives the
//! display list through [`display_list`] every time the collection changes.
use serde::Deserialize;

// ============================================================================
// Data Structures
// ============================================================================

/// A content channel installed (fully or partially) on the device.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    /// Whether the channel's source is currently reachable.
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub on_device_resources: u64,
    #[serde(default)]
    pub total_resources: u64,

    // Supplementary display fields
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub version: u32,
    /// Bytes of channel content stored on the device.
    #[serde(default)]
    pub on_device_file_size: u64,
}

impl Channel {
    /// Build a channel with only the core fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        on_device_resources: u64,
        total_resources: u64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            available: true,
            on_device_resources,
            total_resources,
            description: String::new(),
            version: 0,
            on_device_file_size: 0,
        }
    }

    /// True when at least one resource of this channel is on the device.
    pub fn is_on_device(&self) -> bool {
        self.on_device_resources > 0
    }

    /// Fraction of the channel's resources present on the device, in `[0, 1]`.
    pub fn usage_ratio(&self) -> f64 {
        if self.total_resources == 0 {
            return 0.0;
        }
        (self.on_device_resources as f64 / self.total_resources as f64).clamp(0.0, 1.0)
    }

    /// Human-readable usage, e.g. `"10/40 resources, 1.5 MB"`.
    pub fn usage_label(&self) -> String {
        let counts = format!(
            "{}/{} resources",
            self.on_device_resources, self.total_resources
        );
        if self.on_device_file_size > 0 {
            format!("{}, {}", counts, format_bytes(self.on_device_file_size))
        } else {
            counts
        }
    }
}

/// Format a byte count with binary units and one decimal above bytes.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

// ============================================================================
// Display List
// ============================================================================

/// Derive the render-ready channel list from a raw collection.
///
/// Keeps only channels with on-device resources, regardless of availability,
/// and orders them by name using byte-wise string comparison. The sort is
/// stable, so channels sharing a name keep their collection order.
pub fn display_list(channels: &[Channel]) -> Vec<Channel> {
    let mut visible: Vec<Channel> = channels
        .iter()
        .filter(|c| c.is_on_device())
        .cloned()
        .collect();
    visible.sort_by(|a, b| a.name.cmp(&b.name));
    visible
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ids(channels: &[Channel]) -> Vec<&str> {
        channels.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_sorted_by_name() {
        let raw = vec![
            Channel::new("beautiful_channel", "beautiful channel", 10, 10),
            Channel::new("awesome_channel", "awesome channel", 10, 10),
        ];
        let list = display_list(&raw);
        assert_eq!(ids(&list), vec!["awesome_channel", "beautiful_channel"]);
    }

    #[test]
    fn test_hides_channels_without_resources() {
        let mut unavailable = Channel::new("unavailable", "unavailable channel", 0, 10);
        unavailable.available = false;
        let raw = vec![
            Channel::new("visible_channel", "visible channel", 5, 10),
            Channel::new("hidden_channel", "hidden channel", 0, 10),
            unavailable,
        ];
        let list = display_list(&raw);
        assert_eq!(ids(&list), vec!["visible_channel"]);
    }

    #[test]
    fn test_unavailable_channel_on_device_is_shown() {
        let mut offline = Channel::new("offline", "offline channel", 3, 10);
        offline.available = false;
        let list = display_list(&[offline]);
        assert_eq!(ids(&list), vec!["offline"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(display_list(&[]).is_empty());
    }

    #[test]
    fn test_all_hidden() {
        let raw = vec![
            Channel::new("a", "a", 0, 1),
            Channel::new("b", "b", 0, 0),
        ];
        assert!(display_list(&raw).is_empty());
    }

    #[test]
    fn test_case_sensitive_ordering() {
        // Uppercase sorts before lowercase in byte order
        let raw = vec![
            Channel::new("lower", "alpha", 1, 1),
            Channel::new("upper", "Zeta", 1, 1),
        ];
        assert_eq!(ids(&display_list(&raw)), vec!["upper", "lower"]);
    }

    #[test]
    fn test_ties_keep_collection_order() {
        let raw = vec![
            Channel::new("second", "same", 1, 1),
            Channel::new("first", "same", 1, 1),
            Channel::new("before", "earlier", 1, 1),
        ];
        assert_eq!(ids(&display_list(&raw)), vec!["before", "second", "first"]);
    }

    #[test]
    fn test_input_not_mutated() {
        let raw = vec![
            Channel::new("b", "b", 1, 1),
            Channel::new("a", "a", 1, 1),
        ];
        let before = raw.clone();
        let _ = display_list(&raw);
        assert_eq!(raw, before);
    }

    #[test]
    fn test_usage_ratio() {
        assert_eq!(Channel::new("x", "x", 5, 10).usage_ratio(), 0.5);
        assert_eq!(Channel::new("x", "x", 0, 0).usage_ratio(), 0.0);
        // Inconsistent counters are clamped, not trusted
        assert_eq!(Channel::new("x", "x", 20, 10).usage_ratio(), 1.0);
    }

    #[test]
    fn test_usage_label() {
        let mut channel = Channel::new("x", "x", 10, 40);
        assert_eq!(channel.usage_label(), "10/40 resources");
        channel.on_device_file_size = 1536 * 1024;
        assert_eq!(channel.usage_label(), "10/40 resources, 1.5 MB");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_deserialize_defaults() {
        let channel: Channel =
            serde_json::from_str(r#"{"id": "c1", "name": "Channel One"}"#).unwrap();
        assert_eq!(channel.on_device_resources, 0);
        assert_eq!(channel.total_resources, 0);
        assert!(!channel.available);
        assert!(channel.description.is_empty());
    }

    fn arb_channel() -> impl Strategy<Value = Channel> {
        ("[a-z]{1,6}", "[a-zA-Z ]{0,8}", any::<bool>(), 0u64..5, 0u64..5).prop_map(
            |(id, name, available, on_device, extra)| {
                let mut channel = Channel::new(id, name, on_device, on_device + extra);
                channel.available = available;
                channel
            },
        )
    }

    proptest! {
        #[test]
        fn prop_contains_exactly_on_device(raw in proptest::collection::vec(arb_channel(), 0..20)) {
            let list = display_list(&raw);
            prop_assert!(list.iter().all(Channel::is_on_device));
            let expected = raw.iter().filter(|c| c.is_on_device()).count();
            prop_assert_eq!(list.len(), expected);
        }

        #[test]
        fn prop_sorted_by_name(raw in proptest::collection::vec(arb_channel(), 0..20)) {
            let list = display_list(&raw);
            prop_assert!(list.windows(2).all(|w| w[0].name <= w[1].name));
        }

        #[test]
        fn prop_idempotent(raw in proptest::collection::vec(arb_channel(), 0..20)) {
            let once = display_list(&raw);
            let twice = display_list(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
