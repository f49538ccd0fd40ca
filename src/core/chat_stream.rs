//! Transport adapters that turn a backend response into ordered text chunks.
//!
//! Both transports report through the same channel of
//! `(StreamMessage, stream_id)` pairs, so the controller never needs to know
//! which one produced a chunk. Every exchange that is not cancelled ends
//! with exactly one [`StreamMessage::End`], preceded by
//! [`StreamMessage::Error`] when it failed.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use futures_util::{Stream, StreamExt};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::StreamChatRequest;
use crate::core::config::Transport;
use crate::core::decoder::StreamDecoder;
use crate::core::event_stream::{EventStreamParser, ServerEvent};
use crate::utils::url::construct_api_url;

pub const STREAM_CHAT_PATH: &str = "stream-chat";
pub const STREAM_WITH_GET_PATH: &str = "stream-with-get";
const POST_ACCEPT: &str = "application/json, text/plain, */*";
const MAX_ERROR_BODY: usize = 2048;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    /// The backend accepted the request and the body is being read.
    Started,
    Chunk(String),
    Error(String),
    End,
}

#[derive(Debug)]
pub enum StreamError {
    Status { status: StatusCode, body: String },
    MissingBody,
    Request(reqwest::Error),
    Read(reqwest::Error),
    IdleTimeout(Duration),
    ServerEvent(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Status { status, body } => {
                let body = body.split_whitespace().collect::<Vec<_>>().join(" ");
                if body.is_empty() {
                    write!(f, "backend returned {status}")
                } else {
                    write!(f, "backend returned {status}: {body}")
                }
            }
            StreamError::MissingBody => write!(f, "backend response has no body to stream"),
            StreamError::Request(err) => write!(f, "request failed: {err}"),
            StreamError::Read(err) => write!(f, "stream interrupted: {err}"),
            StreamError::IdleTimeout(limit) => {
                write!(f, "no data received for {}s", limit.as_secs_f32())
            }
            StreamError::ServerEvent(data) if data.trim().is_empty() => {
                write!(f, "server sent an error event")
            }
            StreamError::ServerEvent(data) => write!(f, "server sent an error event: {data}"),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Request(err) | StreamError::Read(err) => Some(err),
            _ => None,
        }
    }
}

/// Where and how to reach the backend.
#[derive(Clone, Debug)]
pub struct StreamSettings {
    pub client: reqwest::Client,
    pub base_url: String,
    pub transport: Transport,
    pub idle_timeout: Option<Duration>,
}

pub struct StreamParams {
    pub settings: StreamSettings,
    pub request: StreamChatRequest,
    pub cancel_token: CancellationToken,
    pub stream_id: u64,
}

pub type StreamReceiver = mpsc::UnboundedReceiver<(StreamMessage, u64)>;

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, StreamReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx_clone = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                settings,
                request,
                cancel_token,
                stream_id,
            } = params;

            tokio::select! {
                _ = run_transport(&settings, &request, &tx_clone, stream_id) => {}
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "stream cancelled");
                }
            }
        });
    }
}

type Sender = mpsc::UnboundedSender<(StreamMessage, u64)>;

async fn run_transport(
    settings: &StreamSettings,
    request: &StreamChatRequest,
    tx: &Sender,
    stream_id: u64,
) {
    debug!(stream_id, transport = settings.transport.as_str(), "opening stream");
    let result = match settings.transport {
        Transport::Post => stream_post(settings, request, tx, stream_id).await,
        Transport::EventSource => stream_events(settings, request, tx, stream_id).await,
    };

    if let Err(err) = result {
        warn!(stream_id, error = %err, "stream failed");
        let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
    }
    let _ = tx.send((StreamMessage::End, stream_id));
}

async fn stream_post(
    settings: &StreamSettings,
    request: &StreamChatRequest,
    tx: &Sender,
    stream_id: u64,
) -> Result<(), StreamError> {
    let chat_url = construct_api_url(&settings.base_url, STREAM_CHAT_PATH);
    let response = settings
        .client
        .post(chat_url)
        .header(ACCEPT, POST_ACCEPT)
        .header(CONTENT_TYPE, "application/json")
        .json(request)
        .send()
        .await
        .map_err(StreamError::Request)?;
    let response = ensure_streamable(response, settings.idle_timeout).await?;
    let _ = tx.send((StreamMessage::Started, stream_id));

    let mut stream = response.bytes_stream();
    let mut decoder = StreamDecoder::new();
    let mut chunks = 0usize;
    while let Some(bytes) = next_chunk(&mut stream, settings.idle_timeout).await? {
        let text = decoder.decode_chunk(&bytes);
        if !text.is_empty() {
            chunks += 1;
            let _ = tx.send((StreamMessage::Chunk(text), stream_id));
        }
    }

    let tail = decoder.finalize();
    if !tail.is_empty() {
        let _ = tx.send((StreamMessage::Chunk(tail), stream_id));
    }
    debug!(stream_id, chunks, "stream body complete");
    Ok(())
}

async fn stream_events(
    settings: &StreamSettings,
    request: &StreamChatRequest,
    tx: &Sender,
    stream_id: u64,
) -> Result<(), StreamError> {
    let events_url = construct_api_url(&settings.base_url, STREAM_WITH_GET_PATH);
    let response = settings
        .client
        .get(events_url)
        .query(&[("question", request.chat.as_str())])
        .header(ACCEPT, "text/event-stream")
        .send()
        .await
        .map_err(StreamError::Request)?;
    let response = ensure_streamable(response, settings.idle_timeout).await?;
    let _ = tx.send((StreamMessage::Started, stream_id));

    let mut stream = response.bytes_stream();
    let mut decoder = StreamDecoder::new();
    let mut parser = EventStreamParser::new();
    while let Some(bytes) = next_chunk(&mut stream, settings.idle_timeout).await? {
        for event in parser.push(&decoder.decode_chunk(&bytes)) {
            forward_event(event, tx, stream_id)?;
        }
    }

    for event in parser.push(&decoder.finalize()) {
        forward_event(event, tx, stream_id)?;
    }
    if let Some(event) = parser.finish() {
        forward_event(event, tx, stream_id)?;
    }
    Ok(())
}

fn forward_event(event: ServerEvent, tx: &Sender, stream_id: u64) -> Result<(), StreamError> {
    match event.name() {
        "message" => {
            if !event.data.is_empty() {
                let _ = tx.send((StreamMessage::Chunk(event.data), stream_id));
            }
            Ok(())
        }
        "error" => Err(StreamError::ServerEvent(event.data)),
        other => {
            debug!(stream_id, event = other, "ignoring server event");
            Ok(())
        }
    }
}

async fn ensure_streamable(
    response: reqwest::Response,
    idle_timeout: Option<Duration>,
) -> Result<reqwest::Response, StreamError> {
    let status = response.status();
    if matches!(
        status,
        StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT | StatusCode::NOT_MODIFIED
    ) {
        return Err(StreamError::MissingBody);
    }
    if !status.is_success() {
        let body = read_error_body(response, idle_timeout).await;
        return Err(StreamError::Status { status, body });
    }
    Ok(response)
}

/// Read at most `MAX_ERROR_BODY` bytes of a rejection body, giving up on
/// the rest when the backend goes quiet.
async fn read_error_body(response: reqwest::Response, idle_timeout: Option<Duration>) -> String {
    let mut stream = response.bytes_stream();
    let mut body = Vec::new();
    while body.len() < MAX_ERROR_BODY {
        match next_chunk(&mut stream, idle_timeout).await {
            Ok(Some(bytes)) => body.extend_from_slice(&bytes),
            Ok(None) => break,
            Err(err) => {
                debug!(error = %err, "error body cut short");
                break;
            }
        }
    }
    body.truncate(MAX_ERROR_BODY);
    String::from_utf8_lossy(&body).into_owned()
}

async fn next_chunk<S, B>(
    stream: &mut S,
    idle_timeout: Option<Duration>,
) -> Result<Option<B>, StreamError>
where
    S: Stream<Item = Result<B, reqwest::Error>> + Unpin,
{
    let next = match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.next())
            .await
            .map_err(|_| StreamError::IdleTimeout(limit))?,
        None => stream.next().await,
    };
    next.transpose().map_err(StreamError::Read)
}
