//! Chatstream is a terminal chat client that renders a model's reply while
//! it is still streaming from the backend.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the transcript, the incremental decoder, the transport
//!   adapters, and the controller state machine that ties one exchange
//!   together.
//! - [`ui`] provides the terminal view and the interactive input loop.
//! - [`commands`] implements the slash commands available in the chat.
//! - [`api`] defines the JSON payloads exchanged with the backend.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
