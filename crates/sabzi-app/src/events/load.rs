use std::path::Path;

use sabzi_capture::prepare_frame;
use sabzi_core::AppEvent;
use sabzi_types::{ImageSource, ToastKind};

use crate::detect_context::DetectContext;

pub async fn handle_file_load(ctx: &DetectContext, path: &Path) -> anyhow::Result<()> {
    let allowed = ctx.state.session.lock().await.ensure_can_load();
    if let Err(e) = allowed {
        ctx.notify(format!("Cannot load an image now: {e}"), ToastKind::Warning)
            .await?;
        return Ok(());
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("[LOAD] Could not read {}: {}", path.display(), e);
            ctx.notify(
                format!("Could not read {}: {e}", path.display()),
                ToastKind::Error,
            )
            .await?;
            return Ok(());
        }
    };

    let quality = ctx.state.config.read().await.capture.jpeg_quality;
    let image = match prepare_frame(bytes, None, quality, ImageSource::File).await {
        Ok(image) => image,
        Err(e) => {
            tracing::warn!("[LOAD] {} is not a usable image: {}", path.display(), e);
            ctx.notify(e.to_string(), ToastKind::Error).await?;
            return Ok(());
        }
    };

    let (width, height) = (image.width(), image.height());
    let loaded = ctx.state.session.lock().await.load_from_file(image);
    if let Err(e) = loaded {
        ctx.notify(format!("Cannot load an image now: {e}"), ToastKind::Warning)
            .await?;
        return Ok(());
    }

    // A file replaces any live camera
    *ctx.state.stream.lock().await = None;
    ctx.state.status.record_upload().await;

    tracing::info!("[LOAD] Loaded {} ({}x{})", path.display(), width, height);
    ctx.send(AppEvent::ShowCaptured {
        width,
        height,
        source: ImageSource::File,
    })
    .await?;
    ctx.notify("Image loaded", ToastKind::Success).await?;
    ctx.publish_controls().await
}
