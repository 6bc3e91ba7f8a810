use std::path::PathBuf;

use kanal::AsyncSender;
use sabzi_core::{AppEvent, UiEvent};
use sabzi_types::ToastKind;

pub const HELP: &str = "\
Commands:
  camera            start the camera
  capture           snapshot the current camera frame
  load <path>       use an image file instead of the camera
  detect            send the current image for detection
  reset             clear the image and results
  location <name>   set the pricing location
  locations         list known locations
  vegetables        list supported vegetables
  compare           compare current items across locations
  checkout          proceed to checkout
  history           show recent price history
  status            show session counters
  quit              exit";

/// Turn one input line into an event. `None` for blank lines.
pub fn parse_command(line: &str) -> Option<Result<AppEvent, String>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let event = match command.to_ascii_lowercase().as_str() {
        "camera" | "start" => Ok(AppEvent::RequestCamera),
        "capture" | "snap" => Ok(AppEvent::CaptureFrame),
        "load" | "upload" if !rest.is_empty() => Ok(AppEvent::LoadFile(PathBuf::from(rest))),
        "load" | "upload" => Err("Usage: load <path>".to_string()),
        "detect" => Ok(AppEvent::Detect),
        "reset" | "clear" => Ok(AppEvent::Reset),
        "location" if !rest.is_empty() => Ok(AppEvent::SetLocation(rest.to_string())),
        "location" => Err("Usage: location <name>".to_string()),
        "locations" => Ok(AppEvent::ListLocations),
        "vegetables" => Ok(AppEvent::ListVegetables),
        "compare" => Ok(AppEvent::ComparePrices),
        "checkout" => Ok(AppEvent::Checkout),
        "history" => Ok(AppEvent::PriceHistory),
        "status" => Ok(AppEvent::ShowStatus),
        "help" | "?" => Ok(AppEvent::ShowText(HELP.to_string())),
        "quit" | "exit" | "q" => Ok(AppEvent::UiEvent(UiEvent::Close)),
        other => Err(format!("Unknown command '{other}'. Type 'help' for a list.")),
    };

    Some(event)
}

/// Parse one line and send it on. Returns `true` once the user asked to quit.
pub async fn forward_line(line: &str, ui_to_app_tx: &AsyncSender<AppEvent>) -> anyhow::Result<bool> {
    let event = match parse_command(line) {
        None => return Ok(false),
        Some(Ok(event)) => event,
        Some(Err(message)) => AppEvent::Notify {
            message,
            kind: ToastKind::Warning,
        },
    };

    let closing = matches!(event, AppEvent::UiEvent(UiEvent::Close));
    ui_to_app_tx.send(event).await?;
    Ok(closing)
}
