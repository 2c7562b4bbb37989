//! Terminal manager for the content channels installed on a device.
//!
//! The core is UI-agnostic: [`grid::ChannelsGrid`] turns a channel
//! collection into render input and runs the delete confirmation workflow,
//! while [`store::ChannelStore`] and [`tasks::DeleteTrigger`] stand in for
//! the device's content database and its background task runner. The
//! [`ui`] module drives all of it from a ratatui front end.

pub mod app;
pub mod channel;
pub mod config;
pub mod grid;
pub mod keybindings;
pub mod store;
pub mod tasks;
pub mod ui;
pub mod util;
pub mod workflow;
