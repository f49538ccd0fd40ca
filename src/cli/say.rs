//! TUI-less "say" command

use std::error::Error;

use crate::core::chat_stream::{ChatStreamService, StreamSettings};
use crate::core::controller::{ChatController, ExchangeTexts};
use crate::core::exchange::run_exchange;
use crate::ui::terminal::TerminalView;

pub async fn run_say(
    prompt: String,
    settings: StreamSettings,
    texts: ExchangeTexts,
) -> Result<(), Box<dyn Error>> {
    if prompt.trim().is_empty() {
        eprintln!("Usage: chatstream say <prompt>");
        std::process::exit(1);
    }

    let mut controller = ChatController::new(settings, texts, TerminalView::stdout(false));
    let (stream_service, mut rx) = ChatStreamService::new();

    tokio::select! {
        _ = run_exchange(&mut controller, &stream_service, &mut rx, &prompt) => {}
        _ = tokio::signal::ctrl_c() => {
            controller.cancel();
        }
    }

    if let Some(reason) = controller.last_error() {
        eprintln!("❌ {}: {}", controller.texts().failure, reason);
        std::process::exit(1);
    }
    Ok(())
}
