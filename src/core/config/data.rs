use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How replies are pulled from the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Transport {
    /// `POST /stream-chat`, body read as raw text chunks
    #[default]
    Post,
    /// `GET /stream-with-get`, server-push `message` events
    EventSource,
}

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Post => "post",
            Transport::EventSource => "event-source",
        }
    }
}

impl std::str::FromStr for Transport {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "post" => Ok(Transport::Post),
            "event-source" | "eventsource" | "sse" => Ok(Transport::EventSource),
            other => Err(format!(
                "unknown transport '{other}' (expected 'post' or 'event-source')"
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Backend root, e.g. "http://localhost:8000"
    pub base_url: Option<String>,
    pub transport: Option<Transport>,
    /// Seconds to wait for the next chunk before failing the exchange; 0 disables
    pub idle_timeout_secs: Option<u64>,
    /// Text committed as the model turn when an exchange fails
    pub failure_text: Option<String>,
    pub placeholder: Option<String>,
    pub waiting_placeholder: Option<String>,
    pub next_placeholder: Option<String>,
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
