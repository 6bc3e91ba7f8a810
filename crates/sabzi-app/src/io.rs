use std::io::BufRead;

use kanal::AsyncSender;
use sabzi_core::{AppEvent, UiEvent};
use sabzi_ui::forward_line;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Read commands from stdin on a plain thread.
///
/// A blocked `read_line` cannot be cancelled, so the thread is detached and
/// never holds up runtime shutdown.
pub fn spawn_stdin_reader(
    ui_to_app_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let handle = Handle::current();
    std::thread::Builder::new()
        .name("sabzi-stdin".to_string())
        .spawn(move || {
            let stdin = std::io::stdin();
            read_commands(stdin.lock(), &handle, &ui_to_app_tx, &cancel);
        })?;
    Ok(())
}

/// Forward lines until quit, EOF or cancellation. EOF counts as quit.
pub fn read_commands<R: BufRead>(
    input: R,
    handle: &Handle,
    ui_to_app_tx: &AsyncSender<AppEvent>,
    cancel: &CancellationToken,
) {
    for line in input.lines() {
        if cancel.is_cancelled() {
            return;
        }

        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("[INPUT] Could not read stdin: {}", e);
                break;
            }
        };

        match handle.block_on(forward_line(&line, ui_to_app_tx)) {
            Ok(true) => return,
            Ok(false) => {}
            Err(e) => {
                tracing::debug!("[INPUT] App stopped listening: {}", e);
                return;
            }
        }
    }

    if cancel.is_cancelled() {
        return;
    }
    tracing::info!("[INPUT] End of input");
    if let Err(e) = handle.block_on(ui_to_app_tx.send(AppEvent::UiEvent(UiEvent::Close))) {
        tracing::debug!("[INPUT] App stopped listening: {}", e);
    }
}
