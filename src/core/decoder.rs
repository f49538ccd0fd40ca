//! Incremental UTF-8 decoding for streamed response bodies.
//!
//! Transports hand over bytes in whatever slices the network produced, so a
//! multi-byte character can straddle two chunks. [`StreamDecoder`] keeps the
//! incomplete tail of one chunk and completes it with the next, producing
//! the same text as decoding the whole body at once.

const REPLACEMENT: char = '\u{FFFD}';

/// Stateful decoder for one response body. Create a fresh one per request.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    pending: Vec<u8>,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, holding back a trailing partial character.
    ///
    /// Malformed sequences become U+FFFD; decoding never fails.
    pub fn decode_chunk(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut decoded = String::with_capacity(self.pending.len());
        let mut input: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(input) {
                Ok(valid) => {
                    decoded.push_str(valid);
                    input = &[];
                    break;
                }
                Err(err) => {
                    let (valid, rest) = input.split_at(err.valid_up_to());
                    if let Ok(valid) = std::str::from_utf8(valid) {
                        decoded.push_str(valid);
                    }
                    match err.error_len() {
                        Some(invalid_len) => {
                            decoded.push(REPLACEMENT);
                            input = &rest[invalid_len..];
                        }
                        None => {
                            input = rest;
                            break;
                        }
                    }
                }
            }
        }

        let consumed = self.pending.len() - input.len();
        self.pending.drain(..consumed);
        decoded
    }

    /// Flush at end of stream. Empty unless the body ended mid-character.
    pub fn finalize(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        self.pending.clear();
        REPLACEMENT.to_string()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
