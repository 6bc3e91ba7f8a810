use sabzi_core::AppEvent;
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;
use crate::events::catalog::refresh_catalog;

/// Readiness check and catalog load. Nothing here is fatal.
pub async fn startup(ctx: DetectContext) -> anyhow::Result<()> {
    match ctx.state.orchestrator.detection().health().await {
        Ok(health) => {
            tracing::info!(
                "[STARTUP] Detection service {} ({})",
                health.status,
                health.message.as_deref().unwrap_or("no message")
            );
            ctx.notify("AI Detection Service Ready!", ToastKind::Success)
                .await?;
        }
        Err(e) => {
            tracing::warn!("[STARTUP] Detection service unavailable: {}", e);
            ctx.notify("AI Service Unavailable", ToastKind::Warning)
                .await?;
        }
    }

    if let Err(e) = refresh_catalog(&ctx.state).await {
        tracing::warn!("[STARTUP] Could not load catalog: {}", e);
    }

    ctx.send(AppEvent::BackendReady).await?;
    ctx.publish_controls().await
}
