mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::transcript::Transcript;
use chrono::Utc;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

const USAGE_DUMP: &str = "Usage: /dump [filename]";

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    Status(String),
    Quit,
    ProcessAsMessage(String),
}

/// Route a line of input: slash commands run here, anything else is a
/// message for the model. Unknown commands are sent as messages.
pub fn process_input(transcript: &Transcript, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    match registry::find_command(command_name) {
        Some(command) => {
            (command.handler)(transcript, CommandInvocation { args })
        }
        None => CommandResult::ProcessAsMessage(input.to_string()),
    }
}

pub(super) fn handle_help(_transcript: &Transcript, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!("\n  {:<18} {}", command.usage, command.help));
    }
    CommandResult::Status(help)
}

pub(super) fn handle_quit(_transcript: &Transcript, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}

pub(super) fn handle_dump(transcript: &Transcript, invocation: CommandInvocation<'_>) -> CommandResult {
    let filename = match invocation.args.split_whitespace().collect::<Vec<_>>().as_slice() {
        [] => format!("chatstream-{}.json", Utc::now().format("%Y-%m-%d")),
        [name] => (*name).to_string(),
        _ => return CommandResult::Status(USAGE_DUMP.to_string()),
    };

    match dump_transcript(transcript, Path::new(&filename)) {
        Ok(()) => CommandResult::Status(format!("Dumped: {filename}")),
        Err(e) => CommandResult::Status(format!("Dump error: {e}")),
    }
}

/// Write the transcript as a JSON array of turns. Never overwrites.
pub fn dump_transcript(transcript: &Transcript, path: &Path) -> Result<(), Box<dyn Error>> {
    if transcript.is_empty() {
        return Err("No conversation to dump - the chat history is empty.".into());
    }

    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|err| -> Box<dyn Error> {
            if err.kind() == ErrorKind::AlreadyExists {
                format!(
                    "File '{}' already exists. Please specify a different filename with /dump <filename>.",
                    path.display()
                )
                .into()
            } else {
                err.into()
            }
        })?;
    let mut writer = BufWriter::new(file);
    writer.write_all(transcript.to_json()?.as_bytes())?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
