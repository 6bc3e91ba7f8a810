//! Image acquisition lifecycle.
//!
//! ```text
//! Idle ──request_camera──► CameraRequested ──granted──► CameraActive ──capture_frame──► Captured
//!   ▲                            │ denied                                                 │
//!   │                            ▼                                              begin_detection
//!   └──────── reset ──────── Error(fault)                                                 ▼
//!                                                       Results ◄──success── Detecting ──failure──► Captured
//! ```
//!
//! `load_from_file` jumps to `Captured` from anywhere except `Detecting`.
//! Every transition is checked; an invalid one leaves the machine untouched.

use std::fmt;
use std::sync::Arc;

use sabzi_types::ControlState;

use crate::error::{CameraFault, CaptureError};
use crate::image::CapturedImage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    CameraRequested,
    CameraActive,
    Captured,
    Detecting,
    Results,
    Error(CameraFault),
}

impl CaptureState {
    /// Controls the user may touch in this state
    pub fn controls(&self) -> ControlState {
        let mut controls = ControlState {
            upload: true,
            reset: true,
            ..ControlState::default()
        };

        match self {
            CaptureState::Idle | CaptureState::Error(_) => {
                controls.camera = true;
            }
            CaptureState::CameraRequested => {}
            CaptureState::CameraActive => {
                controls.camera = true;
                controls.capture = true;
            }
            CaptureState::Captured | CaptureState::Results => {
                controls.detect = true;
            }
            CaptureState::Detecting => {
                controls = ControlState {
                    detect_busy: true,
                    ..ControlState::default()
                };
            }
        }

        controls
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureState::Idle => f.write_str("idle"),
            CaptureState::CameraRequested => f.write_str("waiting for camera"),
            CaptureState::CameraActive => f.write_str("camera active"),
            CaptureState::Captured => f.write_str("image captured"),
            CaptureState::Detecting => f.write_str("detecting"),
            CaptureState::Results => f.write_str("showing results"),
            CaptureState::Error(fault) => write!(f, "camera error ({fault})"),
        }
    }
}

/// Owns the capture state and the current image
#[derive(Debug)]
pub struct CaptureMachine {
    state: CaptureState,
    image: Option<Arc<CapturedImage>>,
}

impl Default for CaptureMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureMachine {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            image: None,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn image(&self) -> Option<&Arc<CapturedImage>> {
        self.image.as_ref()
    }

    fn invalid(&self, action: &'static str) -> CaptureError {
        CaptureError::InvalidTransition {
            action,
            state: self.state,
        }
    }

    fn transition(&mut self, next: CaptureState) {
        tracing::debug!("[CAPTURE] {} -> {}", self.state, next);
        self.state = next;
    }

    pub fn request_camera(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Idle | CaptureState::CameraActive | CaptureState::Error(_) => {
                self.transition(CaptureState::CameraRequested);
                Ok(())
            }
            _ => Err(self.invalid("start the camera")),
        }
    }

    pub fn camera_granted(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::CameraRequested => {
                self.transition(CaptureState::CameraActive);
                Ok(())
            }
            _ => Err(self.invalid("activate the camera")),
        }
    }

    pub fn camera_failed(&mut self, fault: CameraFault) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::CameraRequested => {
                self.transition(CaptureState::Error(fault));
                Ok(())
            }
            _ => Err(self.invalid("report a camera fault")),
        }
    }

    /// Checked before grabbing a frame so nothing is fetched in a bad state
    pub fn ensure_can_capture(&self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::CameraActive => Ok(()),
            _ => Err(self.invalid("capture a frame")),
        }
    }

    pub fn capture_frame(&mut self, image: CapturedImage) -> Result<(), CaptureError> {
        self.ensure_can_capture()?;
        self.image = Some(Arc::new(image));
        self.transition(CaptureState::Captured);
        Ok(())
    }

    pub fn ensure_can_load(&self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Detecting => Err(self.invalid("load an image")),
            _ => Ok(()),
        }
    }

    pub fn load_from_file(&mut self, image: CapturedImage) -> Result<(), CaptureError> {
        self.ensure_can_load()?;
        self.image = Some(Arc::new(image));
        self.transition(CaptureState::Captured);
        Ok(())
    }

    /// Hands the current image to a detection request
    pub fn begin_detection(&mut self) -> Result<Arc<CapturedImage>, CaptureError> {
        match self.state {
            CaptureState::Detecting => Err(CaptureError::DetectionInFlight),
            CaptureState::Captured | CaptureState::Results => {
                let image = self.image.clone().ok_or(CaptureError::NoImage)?;
                self.transition(CaptureState::Detecting);
                Ok(image)
            }
            _ => Err(CaptureError::NoImage),
        }
    }

    pub fn detection_succeeded(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Detecting => {
                self.transition(CaptureState::Results);
                Ok(())
            }
            _ => Err(self.invalid("show results")),
        }
    }

    /// Failed detections go back to `Captured` so the user can retry
    pub fn detection_failed(&mut self) -> Result<(), CaptureError> {
        match self.state {
            CaptureState::Detecting => {
                self.transition(CaptureState::Captured);
                Ok(())
            }
            _ => Err(self.invalid("finish a detection")),
        }
    }

    pub fn reset(&mut self) -> Result<(), CaptureError> {
        if self.state == CaptureState::Detecting {
            return Err(self.invalid("reset"));
        }
        self.image = None;
        self.transition(CaptureState::Idle);
        Ok(())
    }
}
