use std::io::{self, Write};

use tracing::warn;

use crate::core::controller::ViewBinding;

const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Line-oriented view: streamed text is written as it arrives and the
/// terminal's own scrolling keeps the newest output visible.
pub struct TerminalView<W: Write> {
    out: W,
    printed: usize,
    show_hints: bool,
    placeholder: String,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(show_hints: bool) -> Self {
        Self::new(io::stdout(), show_hints)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, show_hints: bool) -> Self {
        Self {
            out,
            printed: 0,
            show_hints,
            placeholder: String::new(),
        }
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Print the input prompt using the current placeholder as a hint.
    pub fn prompt(&mut self) -> io::Result<()> {
        if self.show_hints {
            write!(self.out, "{DIM}{}{RESET}\n> ", self.placeholder)?;
        } else {
            write!(self.out, "> ")?;
        }
        self.out.flush()
    }

    pub fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_delta(&mut self, answer: &str) -> io::Result<()> {
        if answer.is_empty() {
            if self.printed > 0 {
                writeln!(self.out)?;
            }
            self.printed = 0;
            return self.out.flush();
        }
        // the buffer only grows within one exchange
        if answer.len() < self.printed || !answer.is_char_boundary(self.printed) {
            self.printed = 0;
        }
        self.out.write_all(answer[self.printed..].as_bytes())?;
        self.printed = answer.len();
        self.out.flush()
    }
}

impl<W: Write> ViewBinding for TerminalView<W> {
    fn scroll_to_latest(&mut self) {
        if let Err(err) = self.out.flush() {
            warn!(error = %err, "failed to flush terminal output");
        }
    }

    fn answer_updated(&mut self, answer: &str) {
        if let Err(err) = self.write_delta(answer) {
            warn!(error = %err, "failed to write streamed reply");
        }
    }

    fn set_placeholder(&mut self, text: &str) {
        self.placeholder = text.to_string();
    }
}
