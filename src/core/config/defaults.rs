use std::time::Duration;

use crate::core::config::data::{Config, Transport};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FAILURE_TEXT: &str = "Error occurred";
pub const DEFAULT_PLACEHOLDER: &str = "Send a message...";
pub const DEFAULT_WAITING_PLACEHOLDER: &str = "Waiting for model response";
pub const DEFAULT_NEXT_PLACEHOLDER: &str = "Next messages";

/// Keys accepted by `chatstream set` / `chatstream unset`.
pub const SETTABLE_KEYS: &[&str] = &[
    "base-url",
    "transport",
    "idle-timeout",
    "failure-text",
    "placeholder",
    "waiting-placeholder",
    "next-placeholder",
];

impl Config {
    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn transport(&self) -> Transport {
        self.transport.unwrap_or_default()
    }

    /// `None` when the idle timeout is disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        match self.idle_timeout_secs.unwrap_or(DEFAULT_IDLE_TIMEOUT_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn failure_text(&self) -> &str {
        self.failure_text.as_deref().unwrap_or(DEFAULT_FAILURE_TEXT)
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(DEFAULT_PLACEHOLDER)
    }

    pub fn waiting_placeholder(&self) -> &str {
        self.waiting_placeholder
            .as_deref()
            .unwrap_or(DEFAULT_WAITING_PLACEHOLDER)
    }

    pub fn next_placeholder(&self) -> &str {
        self.next_placeholder
            .as_deref()
            .unwrap_or(DEFAULT_NEXT_PLACEHOLDER)
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for '{key}'"));
        }
        match key {
            "base-url" => self.base_url = Some(value.to_string()),
            "transport" => self.transport = Some(value.parse()?),
            "idle-timeout" => {
                let secs = value
                    .parse::<u64>()
                    .map_err(|_| format!("idle-timeout must be a whole number of seconds, got '{value}'"))?;
                self.idle_timeout_secs = Some(secs);
            }
            "failure-text" => self.failure_text = Some(value.to_string()),
            "placeholder" => self.placeholder = Some(value.to_string()),
            "waiting-placeholder" => self.waiting_placeholder = Some(value.to_string()),
            "next-placeholder" => self.next_placeholder = Some(value.to_string()),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: &str) -> Result<(), String> {
        match key {
            "base-url" => self.base_url = None,
            "transport" => self.transport = None,
            "idle-timeout" => self.idle_timeout_secs = None,
            "failure-text" => self.failure_text = None,
            "placeholder" => self.placeholder = None,
            "waiting-placeholder" => self.waiting_placeholder = None,
            "next-placeholder" => self.next_placeholder = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key '{key}'. Available keys: {}",
        SETTABLE_KEYS.join(", ")
    )
}
