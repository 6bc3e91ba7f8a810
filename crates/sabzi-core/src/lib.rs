pub mod capture;
pub mod error;
pub mod image;
pub mod pricing;
pub mod session;
pub mod types;

pub use capture::{CaptureMachine, CaptureState};
pub use error::{CameraFault, CaptureError, DetectError, InvalidRecord};
pub use image::CapturedImage;
pub use pricing::{
    DetectionItem, DetectionOutcome, PriceComparison, PriceSource, ResultSet, Totals, UnitPrice,
};
pub use session::{Completion, DetectionTicket, Session};
pub use types::{AppEvent, UiEvent};
