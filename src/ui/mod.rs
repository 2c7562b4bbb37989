//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Layout and overlays
//! - `helpers` - Background task spawning
//! - `channels` - Channel grid widget
//! - `status` - Status bar widget
//! - `help` - Keybinding help overlay

mod channels;
mod events;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

pub use helpers::spawn_refresh;
pub use loop_runner::{run, Action};
