//! Diagnostic logging setup.
//!
//! Logging stays off unless a file is given, so streamed replies on stdout
//! are never interleaved with log lines.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "chatstream=debug";

/// Install a global subscriber writing to `log_file`. Returns whether one
/// was installed.
pub fn init_tracing(log_file: Option<&Path>) -> Result<bool, Box<dyn Error>> {
    let Some(path) = log_file else {
        return Ok(false);
    };

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })?;

    tracing::info!(path = %path.display(), "logging initialized");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn no_log_file_means_no_subscriber() {
        assert!(!init_tracing(None).expect("no-op"));
    }

    #[test]
    fn unwritable_log_path_is_an_error() {
        let temp_dir = TempDir::new().expect("temp dir");
        // a directory cannot be opened for appending
        assert!(init_tracing(Some(temp_dir.path())).is_err());
    }
}
