//! Parser for server-push event streams (`text/event-stream`).
//!
//! Input is already-decoded text in arbitrary slices; output is whole
//! events, emitted when the blank line that terminates them arrives.

use memchr::memchr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Unnamed events are delivered as `message`.
    pub fn name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: String,
    event: Option<String>,
    data_lines: Vec<String>,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str) -> Vec<ServerEvent> {
        self.buffer.push_str(text);

        let mut events = Vec::new();
        while let Some(newline_pos) = memchr(b'\n', self.buffer.as_bytes()) {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush an event left unterminated when the connection closed.
    pub fn finish(&mut self) -> Option<ServerEvent> {
        if !self.buffer.is_empty() {
            let line = std::mem::take(&mut self.buffer);
            self.process_line(line.trim_end_matches('\r'));
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<ServerEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<ServerEvent> {
        if self.data_lines.is_empty() {
            self.event = None;
            return None;
        }
        Some(ServerEvent {
            event: self.event.take(),
            data: std::mem::take(&mut self.data_lines).join("\n"),
        })
    }
}
