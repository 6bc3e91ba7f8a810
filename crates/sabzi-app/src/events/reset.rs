use sabzi_core::AppEvent;
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;

pub async fn handle_reset(ctx: &DetectContext) -> anyhow::Result<()> {
    let reset = ctx.state.session.lock().await.reset();
    if reset.is_err() {
        ctx.notify(
            "Detection in progress. Reset once it finishes.",
            ToastKind::Warning,
        )
        .await?;
        return Ok(());
    }

    *ctx.state.stream.lock().await = None;
    tracing::info!("[RESET] Session cleared");

    ctx.send(AppEvent::ClearResults).await?;
    ctx.publish_controls().await
}
