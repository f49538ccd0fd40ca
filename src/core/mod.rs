pub mod chat_stream;
pub mod config;
pub mod controller;
pub mod decoder;
pub mod event_stream;
pub mod exchange;
pub mod message;
pub mod transcript;
