use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{process_input, CommandResult};
use crate::core::chat_stream::{ChatStreamService, StreamSettings};
use crate::core::controller::{ChatController, ExchangeTexts};
use crate::core::exchange::run_exchange;
use crate::ui::terminal::TerminalView;

pub async fn run_chat(settings: StreamSettings, texts: ExchangeTexts) -> Result<(), Box<dyn Error>> {
    let mut controller = ChatController::new(settings, texts, TerminalView::stdout(true));
    let (service, mut rx) = ChatStreamService::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    controller
        .view_mut()
        .notice("Type a message and press Enter. /help lists commands, Ctrl+C interrupts a reply.")?;

    loop {
        controller.view_mut().prompt()?;
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let message = match process_input(controller.transcript(), &line) {
            CommandResult::Continue => continue,
            CommandResult::Status(status) => {
                controller.view_mut().notice(&status)?;
                continue;
            }
            CommandResult::Quit => break,
            CommandResult::ProcessAsMessage(message) => message,
        };

        let interrupted = tokio::select! {
            turn = run_exchange(&mut controller, &service, &mut rx, &message) => {
                if turn.is_some() {
                    report_failure(&mut controller)?;
                }
                false
            }
            _ = tokio::signal::ctrl_c() => true,
        };

        if interrupted {
            debug!("reply interrupted");
            if controller.cancel().is_some() {
                report_failure(&mut controller)?;
            }
        }
    }

    controller.cancel();
    Ok(())
}

fn report_failure<W: Write>(controller: &mut ChatController<TerminalView<W>>) -> io::Result<()> {
    let Some(reason) = controller.last_error().map(str::to_owned) else {
        return Ok(());
    };
    let notice = format!("! {} ({reason})", controller.texts().failure);
    controller.view_mut().notice(&notice)
}
