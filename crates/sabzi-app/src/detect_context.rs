use std::sync::Arc;

use kanal::AsyncSender;
use sabzi_core::AppEvent;
use sabzi_types::ToastKind;

use crate::state::AppState;

/// Shared handles every event handler needs.
///
/// `loopback` feeds the app's own event queue; detection tasks report back
/// through it so their completion is applied in order with user events.
#[derive(Clone)]
pub struct DetectContext {
    pub state: Arc<AppState>,
    pub app_to_ui_tx: AsyncSender<AppEvent>,
    pub loopback: AsyncSender<AppEvent>,
}

impl DetectContext {
    pub fn new(
        state: Arc<AppState>,
        app_to_ui_tx: AsyncSender<AppEvent>,
        loopback: AsyncSender<AppEvent>,
    ) -> Self {
        Self {
            state,
            app_to_ui_tx,
            loopback,
        }
    }

    pub async fn send(&self, event: AppEvent) -> anyhow::Result<()> {
        self.app_to_ui_tx.send(event).await?;
        Ok(())
    }

    pub async fn notify(&self, message: impl Into<String>, kind: ToastKind) -> anyhow::Result<()> {
        self.send(AppEvent::Notify {
            message: message.into(),
            kind,
        })
        .await
    }

    /// Push the control enablement for the current capture state
    pub async fn publish_controls(&self) -> anyhow::Result<()> {
        let controls = self.state.session.lock().await.controls();
        self.send(AppEvent::ControlsChanged(controls)).await
    }
}
