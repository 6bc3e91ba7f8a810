use std::path::PathBuf;
use std::sync::Arc;

use sabzi_types::{ControlState, ImageSource, ToastKind};

use crate::error::DetectError;
use crate::pricing::{DetectionOutcome, PriceComparison, ResultSet};

#[derive(Debug, Clone)]
pub enum AppEvent {
    // User intents
    RequestCamera,
    CaptureFrame,
    LoadFile(PathBuf),
    Detect,
    Reset,
    SetLocation(String),
    ListLocations,
    ListVegetables,
    ComparePrices,
    Checkout,
    PriceHistory,
    ShowStatus,

    /// A detection task finished; `generation` ties it to its session cycle
    DetectionFinished {
        generation: u64,
        outcome: Result<DetectionOutcome, DetectError>,
    },

    // Rendering
    Notify { message: String, kind: ToastKind },
    ShowCaptured { width: u32, height: u32, source: ImageSource },
    ShowResults(Arc<ResultSet>),
    ClearResults,
    ControlsChanged(ControlState),
    ShowComparison(Vec<PriceComparison>),
    ShowText(String),
    BackendReady,

    UiEvent(UiEvent),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    Close,
}
