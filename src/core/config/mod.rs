pub mod data;
pub mod defaults;
pub mod io;

pub use data::{Config, Transport};
pub use io::ConfigError;
