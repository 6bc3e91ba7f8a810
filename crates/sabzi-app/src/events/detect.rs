use sabzi_core::{AppEvent, CaptureError, Completion, DetectError, DetectionOutcome};
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;

pub const ESTIMATED_PRICE_WARNING: &str = "Using estimated price due to API error";

/// Error toast text for a failed detection
pub fn failure_message(err: &DetectError) -> String {
    match err {
        DetectError::Network(_) => {
            "Detection failed: could not reach the detection service. Please try again.".to_string()
        }
        DetectError::Http { status } => {
            format!("Detection failed: service returned HTTP {status}. Please try again.")
        }
        DetectError::MalformedResponse(_) => {
            "Detection failed: unexpected response from the detection service. Please try again."
                .to_string()
        }
    }
}

pub async fn handle_detect(ctx: &DetectContext) -> anyhow::Result<()> {
    let ticket = ctx.state.session.lock().await.begin_detection();

    let ticket = match ticket {
        Ok(ticket) => ticket,
        Err(CaptureError::DetectionInFlight) => {
            // The busy control already says so
            tracing::info!("[DETECT] Ignoring detect while a request is in flight");
            return Ok(());
        }
        Err(CaptureError::NoImage) => {
            ctx.notify("Please capture an image first", ToastKind::Error)
                .await?;
            return Ok(());
        }
        Err(e) => {
            ctx.notify(e.to_string(), ToastKind::Warning).await?;
            return Ok(());
        }
    };

    tracing::info!(
        "[DETECT] Request {} (generation {}) for {}",
        ticket.request_id,
        ticket.generation,
        ticket.location
    );
    ctx.publish_controls().await?;
    ctx.notify("Analyzing image with AI...", ToastKind::Info)
        .await?;

    let orchestrator = ctx.state.orchestrator.clone();
    let loopback = ctx.loopback.clone();
    let handle = tokio::spawn(async move {
        let outcome = orchestrator.detect(&ticket.image, &ticket.location).await;
        match &outcome {
            Ok(outcome) => tracing::debug!(
                "[DETECT] Request {} returned {} items",
                ticket.request_id,
                outcome.result_set.len()
            ),
            Err(e) => tracing::warn!("[DETECT] Request {} failed: {}", ticket.request_id, e),
        }

        let finished = AppEvent::DetectionFinished {
            generation: ticket.generation,
            outcome,
        };
        if let Err(e) = loopback.send(finished).await {
            tracing::error!("[DETECT] Could not report detection result: {}", e);
        }
    });

    *ctx.state.in_flight.lock().await = Some(handle);
    Ok(())
}

pub async fn handle_detection_finished(
    ctx: &DetectContext,
    generation: u64,
    outcome: Result<DetectionOutcome, DetectError>,
) -> anyhow::Result<()> {
    let (result, pricing_unavailable) = match outcome {
        Ok(outcome) => (Ok(outcome.result_set), outcome.pricing_unavailable),
        Err(e) => (Err(e), false),
    };

    let completion = ctx
        .state
        .session
        .lock()
        .await
        .finish_detection(generation, result);

    match completion {
        Completion::Applied(set) => {
            ctx.state.status.record_detection(set.len()).await;
            if pricing_unavailable {
                ctx.notify(ESTIMATED_PRICE_WARNING, ToastKind::Warning)
                    .await?;
            }

            ctx.send(AppEvent::ShowResults(set.clone())).await?;
            if set.is_empty() {
                ctx.notify("No vegetables found.", ToastKind::Warning)
                    .await?;
            } else {
                ctx.notify(
                    format!("Detected {} vegetables with live prices!", set.len()),
                    ToastKind::Success,
                )
                .await?;
            }
        }
        Completion::Failed(err) => {
            tracing::error!("[DETECT] Detection failed: {}", err);
            ctx.state.status.record_failure().await;
            ctx.notify(failure_message(&err), ToastKind::Error).await?;
        }
        Completion::Stale => {
            tracing::debug!("[DETECT] Discarded result for generation {}", generation);
            return Ok(());
        }
    }

    ctx.publish_controls().await
}
