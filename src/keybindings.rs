//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Default bindings are registered per context; user overrides from
//! config.toml rebind an action in every context it was bound in.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavTop,
    NavBottom,
    Refresh,
    DeleteChannel,
    ConfirmDelete,
    CancelDelete,
    ShowHelp,
    CloseHelp,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Next channel",
            Self::NavUp => "Previous channel",
            Self::NavTop => "First channel",
            Self::NavBottom => "Last channel",
            Self::Refresh => "Refresh channel list",
            Self::DeleteChannel => "Delete selected channel",
            Self::ConfirmDelete => "Confirm deletion",
            Self::CancelDelete => "Cancel deletion",
            Self::ShowHelp => "Show help",
            Self::CloseHelp => "Close help",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context. Determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    ChannelList,
    /// Delete confirmation overlay. Captures all keys.
    Confirm,
    /// Help overlay. Captures all keys.
    Help,
}

impl Context {
    /// Overlays capture input; only the list falls back to global bindings.
    fn falls_back_to_global(self) -> bool {
        matches!(self, Self::ChannelList)
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Terminals report uppercase letters with SHIFT set; fold it away so
    /// 'G' matches regardless of how the terminal encodes it.
    fn normalized(code: KeyCode, modifiers: KeyModifiers) -> Self {
        match code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                Self::new(code, modifiers.difference(KeyModifiers::SHIFT))
            }
            _ => Self::new(code, modifiers),
        }
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "d", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Delete", "Home", "End"
/// - Modifier combos: "Ctrl+r"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        let c = chars.next()?;
        return chars.next().is_none().then(|| KeySpec::ctrl(c));
    }

    let named = match s.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "delete" | "del" => Some(KeyCode::Delete),
        "backspace" => Some(KeyCode::Backspace),
        "home" => Some(KeyCode::Home),
        "end" => Some(KeyCode::End),
        "space" => Some(KeyCode::Char(' ')),
        _ => None,
    };
    if let Some(code) = named {
        return Some(KeySpec::plain(code));
    }

    if let Some(n) = s
        .strip_prefix(|c: char| c == 'F' || c == 'f')
        .and_then(|rest| rest.parse::<u8>().ok())
    {
        return (1..=12).contains(&n).then(|| KeySpec::plain(KeyCode::F(n)));
    }

    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then(|| KeySpec::plain(KeyCode::Char(c)))
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "nav_top" | "top" => Some(Action::NavTop),
        "nav_bottom" | "bottom" => Some(Action::NavBottom),
        "refresh" => Some(Action::Refresh),
        "delete_channel" | "delete" => Some(Action::DeleteChannel),
        "confirm_delete" | "confirm" => Some(Action::ConfirmDelete),
        "cancel_delete" | "cancel" => Some(Action::CancelDelete),
        "show_help" | "help" => Some(Action::ShowHelp),
        "close_help" => Some(Action::CloseHelp),
        _ => None,
    }
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings in registration order, for the help screen
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        if self.lookup.insert((context, key), action).is_some() {
            // The key no longer triggers whatever it was bound to before
            self.bindings.retain(|(c, k, _)| !(*c == context && *k == key));
        }
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::*;

        // === Global ===
        for (code, action) in [
            (Char('q'), Action::Quit),
            (Char('j'), Action::NavDown),
            (Down, Action::NavDown),
            (Char('k'), Action::NavUp),
            (Up, Action::NavUp),
            (Char('g'), Action::NavTop),
            (Home, Action::NavTop),
            (Char('G'), Action::NavBottom),
            (End, Action::NavBottom),
            (Char('r'), Action::Refresh),
            (Char('?'), Action::ShowHelp),
        ] {
            self.bind(Context::Global, KeySpec::plain(code), action);
        }
        self.bind(Context::Global, KeySpec::ctrl('c'), Action::Quit);

        // === Channel list ===
        self.bind(
            Context::ChannelList,
            KeySpec::plain(Char('d')),
            Action::DeleteChannel,
        );
        self.bind(
            Context::ChannelList,
            KeySpec::plain(Delete),
            Action::DeleteChannel,
        );

        // === Confirmation overlay ===
        for (code, action) in [
            (Char('y'), Action::ConfirmDelete),
            (Char('Y'), Action::ConfirmDelete),
            (Enter, Action::ConfirmDelete),
            (Char('n'), Action::CancelDelete),
            (Char('N'), Action::CancelDelete),
            (Esc, Action::CancelDelete),
        ] {
            self.bind(Context::Confirm, KeySpec::plain(code), action);
        }

        // === Help overlay ===
        for (code, action) in [
            (Esc, Action::CloseHelp),
            (Char('?'), Action::CloseHelp),
            (Char('q'), Action::CloseHelp),
            (Char('j'), Action::NavDown),
            (Down, Action::NavDown),
            (Char('k'), Action::NavUp),
            (Up, Action::NavUp),
        ] {
            self.bind(Context::Help, KeySpec::plain(code), action);
        }
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "delete").
    /// Values are key strings (e.g., "q", "Ctrl+r", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };
            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            let mut contexts: Vec<Context> = Vec::new();
            for (ctx, _, a) in &self.bindings {
                if *a == action && !contexts.contains(ctx) {
                    contexts.push(*ctx);
                }
            }

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);
            for ctx in contexts {
                self.bind(ctx, key, action);
            }

            tracing::info!(action = %action_name, key = %key_str, "Applied keybinding override");
        }

        warnings
    }

    /// Look up the action for a key in a context.
    ///
    /// The channel list falls back to global bindings; overlays do not.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::normalized(code, modifiers);
        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }
        if context.falls_back_to_global() {
            return self.lookup.get(&(Context::Global, key)).copied();
        }
        None
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }

    /// Display strings of the keys bound to `action` in `context`.
    pub fn keys_for(&self, context: Context, action: Action) -> Vec<String> {
        self.bindings
            .iter()
            .filter(|(c, _, a)| *c == context && *a == action)
            .map(|(_, key, _)| format_key(key))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
