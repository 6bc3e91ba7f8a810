use kanal::AsyncReceiver;
use sabzi_core::{AppEvent, UiEvent};
use sabzi_types::ToastKind;

use crate::detect_context::DetectContext;

pub mod camera;
pub mod catalog;
pub mod checkout;
pub mod compare;
pub mod detect;
pub mod history;
pub mod load;
pub mod reset;
pub mod startup;

use camera::{handle_camera_request, handle_frame_capture};
use catalog::{handle_list_locations, handle_list_vegetables, handle_set_location};
use checkout::handle_checkout;
use compare::handle_compare;
use detect::{handle_detect, handle_detection_finished};
use history::handle_price_history;
use load::handle_file_load;
use reset::handle_reset;

/// App's main loop
///
/// Events are handled one at a time; a detection in flight keeps running in
/// its own task and comes back as `DetectionFinished`.
pub async fn event_loop(
    ctx: DetectContext,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    let mut closing = false;

    loop {
        let event = ui_to_app_rx.recv().await?;
        tracing::debug!(
            "[EVENT_LOOP] Event received: {:?}",
            std::mem::discriminant(&event)
        );

        let settles_detection = matches!(
            event,
            AppEvent::Detect | AppEvent::DetectionFinished { .. }
        );

        match event {
            AppEvent::UiEvent(UiEvent::Close) => {
                if ctx.state.session.lock().await.is_detecting() {
                    tracing::info!("[EVENT_LOOP] Close requested, waiting for detection");
                    ctx.notify("Waiting for detection to finish...", ToastKind::Info)
                        .await?;
                    closing = true;
                } else {
                    break;
                }
            }
            event @ AppEvent::DetectionFinished { .. } => {
                handle_events(&ctx, event).await?;
            }
            _ if closing => {
                tracing::debug!("[EVENT_LOOP] Closing, dropping user event");
            }
            event => {
                handle_events(&ctx, event).await?;
            }
        }

        let detecting = ctx.state.session.lock().await.is_detecting();
        if closing && !detecting {
            break;
        }
        if ctx.state.one_shot && settles_detection && !detecting {
            tracing::info!("[EVENT_LOOP] One-shot detection settled");
            break;
        }
    }

    shutdown(&ctx).await
}

async fn handle_events(ctx: &DetectContext, event: AppEvent) -> anyhow::Result<()> {
    match event {
        AppEvent::RequestCamera => handle_camera_request(ctx).await?,
        AppEvent::CaptureFrame => handle_frame_capture(ctx).await?,
        AppEvent::LoadFile(path) => handle_file_load(ctx, &path).await?,
        AppEvent::Detect => handle_detect(ctx).await?,
        AppEvent::DetectionFinished {
            generation,
            outcome,
        } => handle_detection_finished(ctx, generation, outcome).await?,
        AppEvent::Reset => handle_reset(ctx).await?,
        AppEvent::SetLocation(name) => handle_set_location(ctx, &name).await?,
        AppEvent::ListLocations => handle_list_locations(ctx).await?,
        AppEvent::ListVegetables => handle_list_vegetables(ctx).await?,
        AppEvent::ComparePrices => handle_compare(ctx).await?,
        AppEvent::Checkout => handle_checkout(ctx).await?,
        AppEvent::PriceHistory => handle_price_history(ctx).await?,
        AppEvent::ShowStatus => {
            let summary = status_summary(ctx).await;
            ctx.send(AppEvent::ShowText(summary)).await?;
        }

        // Input-side messages go straight to the UI
        event @ (AppEvent::Notify { .. } | AppEvent::ShowText(_)) => {
            ctx.send(event).await?;
        }

        AppEvent::ShowCaptured { .. }
        | AppEvent::ShowResults(_)
        | AppEvent::ClearResults
        | AppEvent::ControlsChanged(_)
        | AppEvent::ShowComparison(_)
        | AppEvent::BackendReady
        | AppEvent::UiEvent(_) => {
            // UI-only event, ignore in backend
        }
    }

    Ok(())
}

async fn status_summary(ctx: &DetectContext) -> String {
    let (state, location) = {
        let session = ctx.state.session.lock().await;
        (session.state().to_string(), session.location().to_string())
    };
    ctx.state
        .status
        .snapshot()
        .await
        .summary(&state, &location)
}

async fn shutdown(ctx: &DetectContext) -> anyhow::Result<()> {
    let in_flight = ctx.state.in_flight.lock().await.take();
    if let Some(handle) = in_flight {
        if let Err(e) = handle.await {
            tracing::error!("[EVENT_LOOP] Detection task failed: {}", e);
        }
    }

    let summary = status_summary(ctx).await;
    tracing::info!("[EVENT_LOOP] Session summary:\n{}", summary);

    ctx.send(AppEvent::UiEvent(UiEvent::Close)).await
}
