use tracing::debug;

use crate::core::chat_stream::{ChatStreamService, StreamReceiver};
use crate::core::controller::{ChatController, ViewBinding};
use crate::core::message::Turn;

/// Run one exchange to completion: submit, stream, settle.
///
/// Returns `None` when the controller refused the submission.
pub async fn run_exchange<V: ViewBinding>(
    controller: &mut ChatController<V>,
    service: &ChatStreamService,
    rx: &mut StreamReceiver,
    message: &str,
) -> Option<Turn> {
    let params = controller.submit(message)?;
    service.spawn_stream(params);

    while let Some((stream_message, stream_id)) = rx.recv().await {
        if let Some(turn) = controller.handle_stream_message(stream_message, stream_id) {
            return Some(turn);
        }
    }

    debug!("stream channel closed before the exchange settled");
    controller.cancel()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Transport;
    use crate::core::controller::{ExchangeState, ExchangeTexts};
    use crate::core::message::TranscriptRole;
    use crate::utils::test_utils::{
        create_test_settings, spawn_mock_server, MockEnding, MockResponse, RecordingView,
    };

    fn controller_for(base_url: &str, transport: Transport) -> ChatController<RecordingView> {
        ChatController::new(
            create_test_settings(base_url, transport),
            ExchangeTexts::default(),
            RecordingView::default(),
        )
    }

    #[tokio::test]
    async fn streamed_reply_becomes_model_turn() {
        let (base_url, _server) = spawn_mock_server(MockResponse::ok(vec![
            b"He".to_vec(),
            b"llo".to_vec(),
            b" there".to_vec(),
        ]))
        .await;
        let mut controller = controller_for(&base_url, Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");

        assert_eq!(turn, Turn::model("Hello there"));
        assert_eq!(
            controller.transcript().snapshot(),
            vec![Turn::user("hello"), Turn::model("Hello there")]
        );
        assert_eq!(controller.state(), ExchangeState::Idle);
        assert_eq!(controller.in_flight(), None);
    }

    #[tokio::test]
    async fn rejected_request_commits_failure_sentinel() {
        let (base_url, _server) = spawn_mock_server(MockResponse {
            status: "500 Internal Server Error",
            content_type: "text/plain",
            chunks: vec![b"boom".to_vec()],
            ending: MockEnding::Complete,
        })
        .await;
        let mut controller = controller_for(&base_url, Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");

        assert_eq!(turn.text, "Error occurred");
        let roles: Vec<_> = controller.transcript().turns().map(|t| t.role).collect();
        assert_eq!(roles, vec![TranscriptRole::User, TranscriptRole::Model]);
    }

    #[tokio::test]
    async fn interrupted_stream_discards_partial_text() {
        let (base_url, _server) = spawn_mock_server(MockResponse {
            ending: MockEnding::Abort,
            ..MockResponse::ok(vec![b"Par".to_vec()])
        })
        .await;
        let mut controller = controller_for(&base_url, Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");

        assert_eq!(turn.text, "Error occurred");
        assert!(controller.is_idle());
    }

    #[tokio::test]
    async fn no_content_response_commits_failure_sentinel() {
        let (base_url, _server) = spawn_mock_server(MockResponse {
            status: "204 No Content",
            ending: MockEnding::NoBody,
            ..MockResponse::ok(Vec::new())
        })
        .await;
        let mut controller = controller_for(&base_url, Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");

        assert_eq!(turn.text, "Error occurred");
        assert_eq!(
            controller.last_error(),
            Some("backend response has no body to stream")
        );
    }

    #[tokio::test]
    async fn empty_success_body_commits_empty_model_turn() {
        let (base_url, _server) = spawn_mock_server(MockResponse {
            content_type: "text/plain",
            ending: MockEnding::NoBody,
            ..MockResponse::ok(Vec::new())
        })
        .await;
        let mut controller = controller_for(&base_url, Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");

        assert_eq!(turn, Turn::model(""));
        assert_eq!(controller.last_error(), None);
        assert_eq!(
            controller.transcript().snapshot(),
            vec![Turn::user("hello"), Turn::model("")]
        );
    }

    #[tokio::test]
    async fn unreachable_backend_settles_instead_of_failing() {
        // nothing listens on the discard port
        let mut controller = controller_for("http://127.0.0.1:9", Transport::Post);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hello")
            .await
            .expect("settled");
        assert_eq!(turn.text, "Error occurred");
    }

    #[tokio::test]
    async fn event_source_exchange_and_follow_up_history() {
        let (base_url, _server) = spawn_mock_server(MockResponse::ok(vec![
            b"data: Hi\n\n".to_vec(),
            b"data: !\n\n".to_vec(),
        ]))
        .await;
        let mut controller = controller_for(&base_url, Transport::EventSource);
        let (service, mut rx) = ChatStreamService::new();

        let turn = run_exchange(&mut controller, &service, &mut rx, "hey")
            .await
            .expect("settled");
        assert_eq!(turn.text, "Hi!");

        assert!(run_exchange(&mut controller, &service, &mut rx, "  ")
            .await
            .is_none());
        assert_eq!(controller.transcript().len(), 2);
    }
}
