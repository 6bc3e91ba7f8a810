use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use kanal::AsyncReceiver;
use sabzi_config::Config;
use sabzi_core::{AppEvent, ResultSet, UiEvent};
use tokio::sync::RwLock;

pub mod input;
pub mod notifier;
pub mod results;
pub mod terminal;

pub use input::{HELP, forward_line, parse_command};
pub use notifier::{Notifier, Toast, ToastPhase, ToastTiming};
pub use results::{ResultsPanel, ResultsView};
pub use terminal::TerminalSurface;

/// Render app events on stdout until the app asks to close
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    config: Arc<RwLock<Config>>,
) -> anyhow::Result<()> {
    let (timing, color, annotated_path) = {
        let config = config.read().await;
        (
            ToastTiming::from_config(&config.ui),
            terminal::detect_color(config.ui.color),
            config.ui.annotated_image_path.clone(),
        )
    };

    let surface = TerminalSurface::new(std::io::stdout(), color);
    run_ui(app_to_ui_rx, surface, Notifier::new(timing), annotated_path).await
}

/// The UI loop proper, over any writer
pub async fn run_ui<W: Write>(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    mut surface: TerminalSurface<W>,
    notifier: Notifier,
    annotated_path: PathBuf,
) -> anyhow::Result<()> {
    let mut toasts = notifier.subscribe();
    let mut panel = ResultsPanel::default();

    loop {
        tokio::select! {
            biased;

            Ok(()) = toasts.changed() => {
                let toast = toasts.borrow_and_update().clone();
                surface.toast(toast.as_ref())?;
            }
            event = app_to_ui_rx.recv() => {
                let Ok(event) = event else {
                    tracing::info!("[UI] App channel closed");
                    break;
                };

                match event {
                    AppEvent::Notify { message, kind } => {
                        notifier.show(message, kind);
                    }
                    AppEvent::ShowResults(set) => {
                        surface.results(panel.show(&set))?;
                        save_annotated(&set, &annotated_path, &mut surface).await?;
                    }
                    AppEvent::ClearResults => {
                        panel.clear();
                    }
                    AppEvent::ShowCaptured { width, height, source } => {
                        surface.captured(width, height, source)?;
                    }
                    AppEvent::ControlsChanged(controls) => {
                        surface.controls(controls)?;
                    }
                    AppEvent::ShowComparison(comparisons) => {
                        surface.comparison(&comparisons)?;
                    }
                    AppEvent::ShowText(text) => {
                        surface.text(&text)?;
                    }
                    AppEvent::BackendReady => {
                        surface.text("Ready. Type 'help' for commands.")?;
                    }
                    AppEvent::UiEvent(UiEvent::Close) => {
                        tracing::info!("[UI] Closing");
                        break;
                    }
                    other => {
                        tracing::debug!("[UI] Ignoring {:?}", std::mem::discriminant(&other));
                    }
                }
            }
        }
    }

    // Whatever toast is up when we close still gets printed
    let last = notifier.current();
    surface.toast(last.as_ref())?;

    Ok(())
}

async fn save_annotated<W: Write>(
    set: &ResultSet,
    path: &Path,
    surface: &mut TerminalSurface<W>,
) -> anyhow::Result<()> {
    let Some(bytes) = set.annotated_image() else {
        return Ok(());
    };

    match tokio::fs::write(path, bytes).await {
        Ok(()) => surface.text(&format!("Annotated image saved to {}", path.display()))?,
        Err(e) => tracing::warn!("[UI] Could not save annotated image to {}: {}", path.display(), e),
    }
    Ok(())
}
