use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePart {
    pub text: String,
}

/// One turn as the backend expects it: `{ "role": ..., "parts": [ { "text": ... } ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTurn {
    pub role: String,
    pub parts: Vec<WirePart>,
}

/// Body of `POST /stream-chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamChatRequest {
    pub chat: String,
    pub history: Vec<WireTurn>,
}
