//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::core::chat_stream::StreamSettings;
use crate::core::config::{Config, Transport};
use crate::core::controller::ExchangeTexts;
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;
use crate::utils::url::normalize_base_url;
use say::run_say;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")");

#[derive(Parser)]
#[command(name = "chatstream")]
#[command(version = VERSION)]
#[command(about = "A terminal chat client that streams model replies as they arrive")]
#[command(
    long_about = "Chatstream sends your message and the conversation so far to a chat backend \
and prints the reply chunk by chunk as it streams in.\n\n\
Backend endpoints:\n\
  POST /stream-chat          JSON {chat, history}, reply streamed as raw text (default)\n\
  GET  /stream-with-get      ?question=..., reply streamed as server-sent events\n\n\
Configuration lives in config.toml under the platform config directory;\n\
use 'chatstream set <key> <value>' to change it. Flags override it per run.\n\n\
Commands inside the chat:\n\
  /help             List commands\n\
  /dump [file]      Export the conversation as JSON\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// How to read replies from the backend
    #[arg(short = 't', long, global = true, value_enum)]
    pub transport: Option<Transport>,

    /// Seconds to wait for the next chunk before giving up (0 waits forever)
    #[arg(long, global = true, value_name = "SECS")]
    pub idle_timeout: Option<u64>,

    /// Write diagnostic logs to this file (filter with RUST_LOG)
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive chat (default)
    Chat,
    /// Send one message, print the streamed reply, and exit
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// Set a configuration value
    Set {
        /// Configuration key: base-url, transport, idle-timeout, failure-text,
        /// placeholder, waiting-placeholder, next-placeholder
        key: String,
        /// Value to set for the key
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset a configuration value
    Unset {
        /// Configuration key to unset
        key: String,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let mut args = Args::parse();
    init_tracing(args.log.as_deref())?;

    match args.command.take().unwrap_or(Commands::Chat) {
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            let value = value.join(" ");
            if let Err(e) = config.set_value(&key, &value) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Set {key} to: {value}");
            Ok(())
        }
        Commands::Unset { key } => {
            let mut config = Config::load()?;
            if let Err(e) = config.unset_value(&key) {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            config.save()?;
            println!("✅ Unset {key}");
            Ok(())
        }
        Commands::Chat => {
            let config = resolve_config(&args)?;
            run_chat(
                stream_settings(&config)?,
                ExchangeTexts::from_config(&config),
            )
            .await
        }
        Commands::Say { prompt } => {
            let config = resolve_config(&args)?;
            run_say(
                prompt.join(" "),
                stream_settings(&config)?,
                ExchangeTexts::from_config(&config),
            )
            .await
        }
    }
}

/// Load the config file and layer command-line overrides on top.
fn resolve_config(args: &Args) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::load()?;
    apply_overrides(&mut config, args);
    Ok(config)
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(base_url) = &args.base_url {
        config.base_url = Some(base_url.clone());
    }
    if let Some(transport) = args.transport {
        config.transport = Some(transport);
    }
    if let Some(secs) = args.idle_timeout {
        config.idle_timeout_secs = Some(secs);
    }
}

fn stream_settings(config: &Config) -> Result<StreamSettings, Box<dyn Error>> {
    let base_url = normalize_base_url(config.base_url());
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(format!(
            "Invalid base URL '{base_url}': expected an http:// or https:// address"
        )
        .into());
    }

    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(StreamSettings {
        client,
        base_url,
        transport: config.transport(),
        idle_timeout: config.idle_timeout(),
    })
}
