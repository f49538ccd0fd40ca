//! The state machine that drives one request/response exchange at a time.
//!
//! `submit` moves the controller from `Idle` to `Sending`, records the user
//! turn and hands back the parameters for the transport to run. Messages
//! from the transport are fed back through `handle_stream_message`, which
//! grows the in-flight answer and, on `End` or `Error`, commits the model
//! turn and returns to `Idle`.
//!
//! A failure at any point commits the configured failure text in place of
//! whatever had streamed so far, so every user turn is followed by exactly
//! one model turn.

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{StreamChatRequest, WireTurn};
use crate::core::chat_stream::{StreamMessage, StreamParams, StreamSettings};
use crate::core::config::defaults::{
    DEFAULT_FAILURE_TEXT, DEFAULT_NEXT_PLACEHOLDER, DEFAULT_PLACEHOLDER,
    DEFAULT_WAITING_PLACEHOLDER,
};
use crate::core::config::Config;
use crate::core::message::Turn;
use crate::core::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    Sending,
    Streaming,
    Settling,
}

/// Hooks into whatever displays the conversation. All default to no-ops.
pub trait ViewBinding {
    fn scroll_to_latest(&mut self) {}

    /// Called with the whole in-flight answer after every change; an empty
    /// string after settling.
    fn answer_updated(&mut self, _answer: &str) {}

    fn set_placeholder(&mut self, _text: &str) {}

    fn clear_input(&mut self) {}

    fn resize_input(&mut self) {}
}

/// User-facing strings the controller commits or shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeTexts {
    pub failure: String,
    pub placeholder: String,
    pub waiting_placeholder: String,
    pub next_placeholder: String,
}

impl Default for ExchangeTexts {
    fn default() -> Self {
        Self {
            failure: DEFAULT_FAILURE_TEXT.to_string(),
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            waiting_placeholder: DEFAULT_WAITING_PLACEHOLDER.to_string(),
            next_placeholder: DEFAULT_NEXT_PLACEHOLDER.to_string(),
        }
    }
}

impl ExchangeTexts {
    pub fn from_config(config: &Config) -> Self {
        Self {
            failure: config.failure_text().to_string(),
            placeholder: config.placeholder().to_string(),
            waiting_placeholder: config.waiting_placeholder().to_string(),
            next_placeholder: config.next_placeholder().to_string(),
        }
    }
}

pub struct ChatController<V: ViewBinding> {
    settings: StreamSettings,
    texts: ExchangeTexts,
    transcript: Transcript,
    state: ExchangeState,
    in_flight: String,
    accumulator: String,
    current_stream_id: u64,
    cancel_token: Option<CancellationToken>,
    last_error: Option<String>,
    view: V,
}

impl<V: ViewBinding> ChatController<V> {
    pub fn new(settings: StreamSettings, texts: ExchangeTexts, mut view: V) -> Self {
        view.set_placeholder(&texts.placeholder);
        Self {
            settings,
            texts,
            transcript: Transcript::new(),
            state: ExchangeState::Idle,
            in_flight: String::new(),
            accumulator: String::new(),
            current_stream_id: 0,
            cancel_token: None,
            last_error: None,
            view,
        }
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == ExchangeState::Idle
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// The partial answer while a reply is streaming, `None` otherwise.
    pub fn in_flight(&self) -> Option<&str> {
        match self.state {
            ExchangeState::Streaming => Some(self.in_flight.as_str()),
            _ => None,
        }
    }

    pub fn current_stream_id(&self) -> u64 {
        self.current_stream_id
    }

    /// Why the most recent exchange failed, if it did.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn texts(&self) -> &ExchangeTexts {
        &self.texts
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Start an exchange for `message`.
    ///
    /// Returns `None` without touching anything when the message is blank or
    /// another exchange has not settled yet.
    pub fn submit(&mut self, message: &str) -> Option<StreamParams> {
        if message.trim().is_empty() {
            debug!("ignoring empty submission");
            return None;
        }
        if self.state != ExchangeState::Idle {
            debug!(state = ?self.state, "exchange in flight, ignoring submission");
            return None;
        }

        self.state = ExchangeState::Sending;
        let history = self.transcript.snapshot();
        self.transcript.append(Turn::user(message));

        self.view.clear_input();
        self.view.resize_input();
        self.view.set_placeholder(&self.texts.waiting_placeholder);
        self.view.scroll_to_latest();

        self.in_flight.clear();
        self.accumulator.clear();
        self.last_error = None;
        let (cancel_token, stream_id) = self.start_new_stream();
        debug!(stream_id, history = history.len(), "exchange started");

        Some(StreamParams {
            settings: self.settings.clone(),
            request: StreamChatRequest {
                chat: message.to_string(),
                history: history.into_iter().map(WireTurn::from).collect(),
            },
            cancel_token,
            stream_id,
        })
    }

    /// Apply one transport message. Returns the committed model turn once
    /// the exchange settles.
    pub fn handle_stream_message(&mut self, message: StreamMessage, stream_id: u64) -> Option<Turn> {
        if stream_id != self.current_stream_id || self.state == ExchangeState::Idle {
            debug!(stream_id, current = self.current_stream_id, "dropping stale stream message");
            return None;
        }

        match message {
            StreamMessage::Started => {
                self.state = ExchangeState::Streaming;
                self.in_flight.clear();
                self.view.answer_updated(&self.in_flight);
                None
            }
            StreamMessage::Chunk(text) => {
                self.state = ExchangeState::Streaming;
                self.in_flight.push_str(&text);
                self.accumulator.push_str(&text);
                self.view.answer_updated(&self.in_flight);
                self.view.scroll_to_latest();
                None
            }
            StreamMessage::Error(reason) => {
                warn!(stream_id, %reason, "exchange failed");
                self.accumulator.clone_from(&self.texts.failure);
                self.last_error = Some(reason);
                Some(self.settle())
            }
            StreamMessage::End => Some(self.settle()),
        }
    }

    /// Abort the running exchange, if any, committing the failure text.
    pub fn cancel(&mut self) -> Option<Turn> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        if self.state == ExchangeState::Idle {
            return None;
        }
        debug!(stream_id = self.current_stream_id, "exchange cancelled");
        self.accumulator.clone_from(&self.texts.failure);
        self.last_error = Some("cancelled".to_string());
        Some(self.settle())
    }

    fn start_new_stream(&mut self) -> (CancellationToken, u64) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        let token = CancellationToken::new();
        self.cancel_token = Some(token.clone());
        self.current_stream_id += 1;
        (token, self.current_stream_id)
    }

    fn settle(&mut self) -> Turn {
        self.state = ExchangeState::Settling;
        let turn = Turn::model(std::mem::take(&mut self.accumulator));
        self.transcript.append(turn.clone());

        self.in_flight.clear();
        self.view.answer_updated("");
        self.view.set_placeholder(&self.texts.next_placeholder);
        self.cancel_token = None;
        self.state = ExchangeState::Idle;
        debug!(
            stream_id = self.current_stream_id,
            chars = turn.text.chars().count(),
            "exchange settled"
        );
        turn
    }
}

impl<V: ViewBinding> Drop for ChatController<V> {
    fn drop(&mut self) {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
