//! Utility functions for common operations.
//!
//! - **Text processing**: terminal-safe labels and Unicode-aware truncation
//!
//! # Examples
//!
//! ```
//! use chanman::util::{display_width, truncate_to_width};
//!
//! assert_eq!(display_width("Hello"), 5);
//! assert_eq!(truncate_to_width("A very long channel name", 10), "A very ...");
//! ```

mod text;

pub use text::{display_width, sanitize_label, truncate_to_width};
