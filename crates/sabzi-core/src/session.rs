use std::sync::Arc;

use sabzi_types::{ControlState, Location};
use uuid::Uuid;

use crate::capture::{CaptureMachine, CaptureState};
use crate::error::{CameraFault, CaptureError, DetectError};
use crate::image::CapturedImage;
use crate::pricing::ResultSet;

/// Everything a detection request needs, detached from the session lock
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    pub generation: u64,
    pub request_id: Uuid,
    pub image: Arc<CapturedImage>,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    Applied(Arc<ResultSet>),
    Failed(DetectError),
    /// The session moved on while the request was in flight
    Stale,
}

/// One user's capture → detect → bill cycle
///
/// `generation` is bumped on every detection start and every reset, so a
/// completion can only land on the cycle that issued it.
#[derive(Debug, Default)]
pub struct Session {
    machine: CaptureMachine,
    results: Option<Arc<ResultSet>>,
    location: Location,
    generation: u64,
}

impl Session {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            ..Self::default()
        }
    }

    pub fn state(&self) -> CaptureState {
        self.machine.state()
    }

    pub fn controls(&self) -> ControlState {
        self.machine.state().controls()
    }

    pub fn image(&self) -> Option<&Arc<CapturedImage>> {
        self.machine.image()
    }

    pub fn results(&self) -> Option<&Arc<ResultSet>> {
        self.results.as_ref()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_detecting(&self) -> bool {
        self.machine.state() == CaptureState::Detecting
    }

    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    pub fn request_camera(&mut self) -> Result<(), CaptureError> {
        self.machine.request_camera()
    }

    pub fn camera_granted(&mut self) -> Result<(), CaptureError> {
        self.machine.camera_granted()
    }

    pub fn camera_failed(&mut self, fault: CameraFault) -> Result<(), CaptureError> {
        self.machine.camera_failed(fault)
    }

    pub fn ensure_can_capture(&self) -> Result<(), CaptureError> {
        self.machine.ensure_can_capture()
    }

    pub fn capture_frame(&mut self, image: CapturedImage) -> Result<(), CaptureError> {
        self.machine.capture_frame(image)
    }

    pub fn ensure_can_load(&self) -> Result<(), CaptureError> {
        self.machine.ensure_can_load()
    }

    /// Results stay until the next detection succeeds or a reset
    pub fn load_from_file(&mut self, image: CapturedImage) -> Result<(), CaptureError> {
        self.machine.load_from_file(image)
    }

    pub fn begin_detection(&mut self) -> Result<DetectionTicket, CaptureError> {
        let image = self.machine.begin_detection()?;
        self.generation += 1;

        Ok(DetectionTicket {
            generation: self.generation,
            request_id: Uuid::new_v4(),
            image,
            location: self.location.clone(),
        })
    }

    /// Apply a finished request if it still belongs to this cycle
    pub fn finish_detection(
        &mut self,
        generation: u64,
        outcome: Result<ResultSet, DetectError>,
    ) -> Completion {
        if generation != self.generation || !self.is_detecting() {
            tracing::debug!(
                "[SESSION] Dropping completion for generation {} (current {}, {})",
                generation,
                self.generation,
                self.machine.state()
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(result_set) => {
                let result_set = Arc::new(result_set);
                let moved = self.machine.detection_succeeded();
                debug_assert!(moved.is_ok(), "{moved:?}");
                self.results = Some(result_set.clone());
                Completion::Applied(result_set)
            }
            Err(err) => {
                let moved = self.machine.detection_failed();
                debug_assert!(moved.is_ok(), "{moved:?}");
                Completion::Failed(err)
            }
        }
    }

    pub fn reset(&mut self) -> Result<(), CaptureError> {
        self.machine.reset()?;
        self.results = None;
        self.generation += 1;
        Ok(())
    }
}
