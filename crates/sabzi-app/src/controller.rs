use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use sabzi_core::{AppEvent, UiEvent};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::detect_context::DetectContext;
use crate::events::event_loop;
use crate::events::startup::startup;
use crate::io::spawn_stdin_reader;
use crate::state::AppState;

/// Centralized channel management
pub struct ChannelSet {
    pub app_to_ui: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub ui_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
}

impl ChannelSet {
    pub fn new() -> Self {
        Self {
            app_to_ui: kanal::bounded_async(256), // toasts, tables, controls
            ui_to_app: kanal::bounded_async(64),  // commands and detection results
        }
    }
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    state: Arc<AppState>,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            channels: ChannelSet::new(),
            state,
            cancel_token: CancellationToken::new(),
        }
    }

    /// Sender into the app's event queue
    pub fn sender(&self) -> AsyncSender<AppEvent> {
        self.channels.ui_to_app.0.clone()
    }

    /// Cancelled once the UI has gone away
    pub fn cancelled(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn spawn_tasks(&self, read_stdin: bool) -> anyhow::Result<JoinSet<anyhow::Result<()>>> {
        let mut tasks = JoinSet::new();
        let ctx = DetectContext::new(
            self.state.clone(),
            self.channels.app_to_ui.0.clone(),
            self.channels.ui_to_app.0.clone(),
        );

        // Event loop
        tasks.spawn(event_loop(ctx.clone(), self.channels.ui_to_app.1.clone()));

        // UI loop; the rest of the app winds down once it returns
        let ui_rx = self.channels.app_to_ui.1.clone();
        let config = self.state.config.clone();
        let cancel = self.cancel_token.clone();
        tasks.spawn(async move {
            let result = sabzi_ui::ui_loop(ui_rx, config).await;
            cancel.cancel();
            result
        });

        // Startup checks
        let cancel = self.cancel_token.child_token();
        tasks.spawn(async move {
            tokio::select! {
                result = startup(ctx) => result,
                _ = cancel.cancelled() => Ok(()),
            }
        });

        if read_stdin {
            spawn_stdin_reader(
                self.channels.ui_to_app.0.clone(),
                self.cancel_token.child_token(),
            )?;
        }

        Ok(tasks)
    }

    /// Ask the event loop to close; it waits for any detection in flight
    pub async fn request_close(&self) -> anyhow::Result<()> {
        self.channels
            .ui_to_app
            .0
            .send(AppEvent::UiEvent(UiEvent::Close))
            .await?;
        Ok(())
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
