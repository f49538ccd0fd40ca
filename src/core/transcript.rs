use std::collections::VecDeque;

use crate::api::WireTurn;
use crate::core::message::Turn;

/// Ordered log of committed turns.
///
/// Only the streaming controller appends; everything else reads through
/// [`Transcript::turns`] or takes an owned [`Transcript::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    turns: VecDeque<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, turn: Turn) {
        self.turns.push_back(turn);
    }

    /// Owned copy of the current turns. Later appends never show up in it.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.iter().cloned().collect()
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.back()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let wire: Vec<WireTurn> = self.snapshot().into_iter().map(WireTurn::from).collect();
        serde_json::to_string_pretty(&wire)
    }
}
