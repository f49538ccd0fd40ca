//! Terminal front end for interactive sessions.
//!
//! - [`terminal`]: the [`crate::core::controller::ViewBinding`] that writes
//!   streamed replies to the terminal.
//! - [`chat_loop`]: reads input lines, dispatches slash commands through
//!   [`crate::commands`], and runs exchanges via [`crate::core::exchange`].

pub mod chat_loop;
pub mod terminal;
