use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use sabzi_config::Config;
use sabzi_core::AppEvent;
use sabzi_types::Location;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use crate::controller::AppController;
use crate::profile::load_profile;
use crate::state::AppState;

mod controller;
mod detect_context;
mod events;
mod io;
mod profile;
mod state;
mod status;

#[cfg(test)]
mod tests;

/// Photograph vegetables, detect them and price the bill
#[derive(Parser, Debug)]
#[command(name = "sabzi", version)]
struct Args {
    /// JSON profile to use instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Detect this image, print the bill and exit
    #[arg(long)]
    image: Option<PathBuf>,

    /// Pricing location, e.g. Mumbai
    #[arg(long)]
    location: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine
    let _ = dotenvy::dotenv();
    let args = Args::parse();
    init_tracing(args.log_json);

    let mut config = match &args.config {
        Some(path) => load_profile(path)?,
        None => Config::new(),
    };
    if let Some(name) = &args.location {
        config.pricing.default_location =
            Location::parse(name).context("--location must not be empty")?;
    }
    tracing::info!(
        "Detection at {}, pricing at {}, location {}",
        config.network.detection_url(),
        config.network.pricing_url(),
        config.pricing.default_location
    );

    let one_shot = args.image.is_some();
    let state = Arc::new(AppState::from_config(config).with_one_shot(one_shot));
    let controller = AppController::new(state);
    let mut tasks = controller.spawn_tasks(!one_shot)?;

    if let Some(path) = args.image {
        let sender = controller.sender();
        sender.send(AppEvent::LoadFile(path)).await?;
        sender.send(AppEvent::Detect).await?;
    }

    let ui_gone = controller.cancelled();
    let mut close_requested = false;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                if close_requested {
                    tracing::warn!("Second interrupt, stopping now");
                    break;
                }
                tracing::info!("Shutdown requested");
                close_requested = true;
                controller.request_close().await?;
            }
            _ = ui_gone.cancelled() => break,
            joined = tasks.join_next() => match joined {
                None => break,
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(e))) => tracing::error!("Task exited: {e:#}"),
                Some(Err(e)) => tracing::error!("Task panicked: {e}"),
            },
        }
    }

    controller.shutdown();
    tasks.abort_all();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Err(e)) => tracing::error!("Task exited: {e:#}"),
            Err(e) if e.is_panic() => tracing::error!("Task panicked: {e}"),
            _ => {}
        }
    }

    Ok(())
}
