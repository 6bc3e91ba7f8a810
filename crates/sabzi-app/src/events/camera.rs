use sabzi_core::{AppEvent, CaptureError};
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;

pub async fn handle_camera_request(ctx: &DetectContext) -> anyhow::Result<()> {
    let requested = ctx.state.session.lock().await.request_camera();
    if let Err(e) = requested {
        tracing::debug!("[CAMERA] Request refused: {}", e);
        ctx.notify(format!("Cannot start camera: {e}"), ToastKind::Warning)
            .await?;
        return Ok(());
    }
    ctx.publish_controls().await?;

    let constraints = ctx.state.stream_constraints().await;
    tracing::info!(
        "[CAMERA] Opening camera (facing {}, max {}x{})",
        constraints.facing.as_str(),
        constraints.max_width,
        constraints.max_height
    );
    let opened = ctx.state.camera.open(&constraints).await;

    let (message, kind) = {
        let mut session = ctx.state.session.lock().await;
        let mut stream = ctx.state.stream.lock().await;

        match opened {
            Ok(opened) => {
                session.camera_granted()?;
                *stream = Some(opened);
                ("Camera started successfully", ToastKind::Success)
            }
            Err(fault) => {
                tracing::warn!("[CAMERA] Camera unavailable: {}", fault);
                session.camera_failed(fault)?;
                *stream = None;
                (fault.user_message(), ToastKind::Error)
            }
        }
    };

    ctx.notify(message, kind).await?;
    ctx.publish_controls().await
}

pub async fn handle_frame_capture(ctx: &DetectContext) -> anyhow::Result<()> {
    if ctx.state.session.lock().await.ensure_can_capture().is_err() {
        ctx.notify("Camera not started", ToastKind::Error).await?;
        return Ok(());
    }

    let grabbed = {
        let mut stream = ctx.state.stream.lock().await;
        match stream.as_mut() {
            Some(stream) => stream.grab_frame().await,
            None => Err(CaptureError::NoImage),
        }
    };

    let image = match grabbed {
        Ok(image) => image,
        Err(e) => {
            tracing::error!("[CAMERA] Frame grab failed: {}", e);
            ctx.notify("Failed to capture image", ToastKind::Error)
                .await?;
            return Ok(());
        }
    };

    let (width, height, source) = (image.width(), image.height(), image.source());
    ctx.state.session.lock().await.capture_frame(image)?;
    // The stream is only needed until a frame is taken
    *ctx.state.stream.lock().await = None;
    ctx.state.status.record_capture().await;

    tracing::info!("[CAMERA] Captured {}x{} frame", width, height);
    ctx.send(AppEvent::ShowCaptured {
        width,
        height,
        source,
    })
    .await?;
    ctx.notify("Image captured successfully", ToastKind::Success)
        .await?;
    ctx.publish_controls().await
}
