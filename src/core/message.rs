use serde::{Deserialize, Serialize};

use crate::api::{WirePart, WireTurn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TranscriptRole {
    User,
    Model,
}

impl TranscriptRole {
    pub fn as_str(self) -> &'static str {
        match self {
            TranscriptRole::User => "user",
            TranscriptRole::Model => "model",
        }
    }
}

impl TryFrom<&str> for TranscriptRole {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(TranscriptRole::User),
            "model" => Ok(TranscriptRole::Model),
            _ => Err(format!("invalid transcript role: {value}")),
        }
    }
}

impl TryFrom<String> for TranscriptRole {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<TranscriptRole> for String {
    fn from(value: TranscriptRole) -> Self {
        value.as_str().to_string()
    }
}

/// One committed message in the conversation.
///
/// Serializes in the backend's turn shape, with `parts` always holding a
/// single text part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireTurn", try_from = "WireTurn")]
pub struct Turn {
    pub role: TranscriptRole,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TranscriptRole::Model,
            text: text.into(),
        }
    }
}

impl From<Turn> for WireTurn {
    fn from(turn: Turn) -> Self {
        WireTurn {
            role: turn.role.into(),
            parts: vec![WirePart { text: turn.text }],
        }
    }
}

impl TryFrom<WireTurn> for Turn {
    type Error = String;

    fn try_from(wire: WireTurn) -> Result<Self, Self::Error> {
        let role = TranscriptRole::try_from(wire.role.as_str())?;
        let text = wire
            .parts
            .into_iter()
            .map(|part| part.text)
            .collect::<Vec<_>>()
            .join("");
        Ok(Turn { role, text })
    }
}
