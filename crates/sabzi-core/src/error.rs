use crate::capture::CaptureState;

/// Why a live camera stream could not be opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CameraFault {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera found")]
    DeviceNotFound,

    #[error("camera requires a secure connection")]
    InsecureContext,

    #[error("camera not supported")]
    Unsupported,
}

impl CameraFault {
    /// Text shown to the user in the error toast
    pub fn user_message(&self) -> &'static str {
        match self {
            CameraFault::PermissionDenied => {
                "Camera permission denied. Please allow camera access and try again."
            }
            CameraFault::DeviceNotFound => "No camera found on this device.",
            CameraFault::InsecureContext => "Camera requires HTTPS. Please use an https:// URL.",
            CameraFault::Unsupported => "Camera not supported on this setup.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: CaptureState,
    },

    #[error("capture or upload an image first")]
    NoImage,

    #[error("a detection request is already in flight")]
    DetectionInFlight,

    #[error(transparent)]
    Camera(#[from] CameraFault),

    #[error("could not read image: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DetectError {
    #[error("network error: {0}")]
    Network(String),

    #[error("detection service returned HTTP {status}")]
    Http { status: u16 },

    #[error("malformed detection response: {0}")]
    MalformedResponse(String),
}

/// A backend record that can't become a line item
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRecord {
    #[error("detection #{index} has no vegetable name")]
    MissingName { index: usize },

    #[error("detection #{index} ({vegetable}) has non-positive quantity {quantity}")]
    Quantity {
        index: usize,
        vegetable: String,
        quantity: f64,
    },

    #[error("detection #{index} ({vegetable}) has confidence {confidence} outside [0, 1]")]
    Confidence {
        index: usize,
        vegetable: String,
        confidence: f64,
    },

    #[error("detection #{index} ({vegetable}) has invalid price {price}")]
    Price {
        index: usize,
        vegetable: String,
        price: f64,
    },
}

impl From<InvalidRecord> for DetectError {
    fn from(err: InvalidRecord) -> Self {
        DetectError::MalformedResponse(err.to_string())
    }
}
