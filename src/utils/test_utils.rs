#[cfg(test)]
use crate::core::chat_stream::StreamSettings;
#[cfg(test)]
use crate::core::config::Transport;
#[cfg(test)]
use crate::core::controller::{ChatController, ExchangeTexts, ViewBinding};
#[cfg(test)]
use crate::core::message::Turn;
#[cfg(test)]
use crate::core::transcript::Transcript;
#[cfg(test)]
use std::time::Duration;
#[cfg(test)]
use tokio::io::{AsyncReadExt, AsyncWriteExt};
#[cfg(test)]
use tokio::net::{TcpListener, TcpStream};
#[cfg(test)]
use tokio::task::JoinHandle;

#[cfg(test)]
pub fn create_test_settings(base_url: &str, transport: Transport) -> StreamSettings {
    StreamSettings {
        client: reqwest::Client::builder()
            .no_proxy()
            .build()
            .expect("test client"),
        base_url: base_url.to_string(),
        transport,
        idle_timeout: Some(Duration::from_secs(5)),
    }
}

#[cfg(test)]
pub fn create_test_controller() -> ChatController<RecordingView> {
    ChatController::new(
        create_test_settings("http://127.0.0.1:9", Transport::Post),
        ExchangeTexts::default(),
        RecordingView::default(),
    )
}

#[cfg(test)]
pub fn create_test_transcript() -> Transcript {
    let mut transcript = Transcript::new();
    transcript.append(Turn::user("Hello"));
    transcript.append(Turn::model("Hi there!"));
    transcript
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Scroll,
    Answer(String),
    Placeholder(String),
    ClearInput,
    ResizeInput,
}

#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

#[cfg(test)]
impl ViewBinding for RecordingView {
    fn scroll_to_latest(&mut self) {
        self.events.push(ViewEvent::Scroll);
    }

    fn answer_updated(&mut self, answer: &str) {
        self.events.push(ViewEvent::Answer(answer.to_string()));
    }

    fn set_placeholder(&mut self, text: &str) {
        self.events.push(ViewEvent::Placeholder(text.to_string()));
    }

    fn clear_input(&mut self) {
        self.events.push(ViewEvent::ClearInput);
    }

    fn resize_input(&mut self) {
        self.events.push(ViewEvent::ResizeInput);
    }
}

/// How the mock server finishes a response body.
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub enum MockEnding {
    /// Terminating zero-length chunk, then close.
    Complete,
    /// Close the socket without finishing the chunked body.
    Abort,
    /// Keep the connection open and silent.
    Stall(Duration),
    /// `content-length: 0` instead of a chunked body; chunks are ignored.
    NoBody,
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: &'static str,
    pub content_type: &'static str,
    pub chunks: Vec<Vec<u8>>,
    pub ending: MockEnding,
}

#[cfg(test)]
impl MockResponse {
    pub fn ok(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            status: "200 OK",
            content_type: "text/event-stream",
            chunks,
            ending: MockEnding::Complete,
        }
    }
}

#[cfg(test)]
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

#[cfg(test)]
impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Serve one request on a local port with a chunked response.
///
/// Returns the base URL and a handle resolving to the captured request.
#[cfg(test)]
pub async fn spawn_mock_server(
    response: MockResponse,
) -> (String, JoinHandle<Result<CapturedRequest, String>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.map_err(|err| err.to_string())?;
        let captured = read_http_request(&mut stream).await?;

        let framing = match response.ending {
            MockEnding::NoBody => "content-length: 0",
            _ => "transfer-encoding: chunked",
        };
        let head = format!(
            "HTTP/1.1 {}\r\ncontent-type: {}\r\n{framing}\r\nconnection: close\r\n\r\n",
            response.status, response.content_type
        );
        stream
            .write_all(head.as_bytes())
            .await
            .map_err(|err| err.to_string())?;
        if matches!(response.ending, MockEnding::NoBody) {
            stream.flush().await.map_err(|err| err.to_string())?;
            return Ok(captured);
        }

        for chunk in &response.chunks {
            let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
            frame.extend_from_slice(chunk);
            frame.extend_from_slice(b"\r\n");
            stream
                .write_all(&frame)
                .await
                .map_err(|err| err.to_string())?;
            stream.flush().await.map_err(|err| err.to_string())?;
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        match response.ending {
            MockEnding::Complete => {
                stream
                    .write_all(b"0\r\n\r\n")
                    .await
                    .map_err(|err| err.to_string())?;
                stream.flush().await.map_err(|err| err.to_string())?;
            }
            MockEnding::Abort => {}
            MockEnding::Stall(duration) => tokio::time::sleep(duration).await,
            MockEnding::NoBody => {}
        }
        Ok(captured)
    });

    (format!("http://{addr}"), handle)
}

#[cfg(test)]
async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let header_end = loop {
        let mut chunk = [0_u8; 1024];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default().to_string();
    let mut headers = Vec::new();
    let mut content_length = 0;
    for line in lines.filter(|line| !line.is_empty()) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length.saturating_sub(body.len())];
        let read = stream
            .read(&mut chunk)
            .await
            .map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}
