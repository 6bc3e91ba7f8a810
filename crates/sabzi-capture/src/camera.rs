use sabzi_config::capture::CaptureConfig;
use sabzi_core::{CameraFault, CaptureError, CapturedImage};

/// Which way the camera should face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    /// Rear camera, pointed at the produce
    Environment,
    User,
}

impl Facing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Facing::Environment => "environment",
            Facing::User => "user",
        }
    }
}

/// What the caller wants from a live stream. Backends honour these where
/// they can; the resulting frame size is not guaranteed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: Facing,
    pub max_width: u32,
    pub max_height: u32,
    pub jpeg_quality: u8,
}

impl StreamConstraints {
    pub fn from_config(config: &CaptureConfig) -> Self {
        let (max_width, max_height) = config.max_frame_size();
        Self {
            facing: Facing::Environment,
            max_width,
            max_height,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self::from_config(&CaptureConfig::default())
    }
}

/// Source of live video streams
#[async_trait::async_trait]
pub trait Camera: Send + Sync {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraFault>;
}

/// An open stream that can be snapshotted
#[async_trait::async_trait]
pub trait VideoStream: Send + Sync {
    /// Grab the current frame as an upload-ready JPEG
    async fn grab_frame(&mut self) -> Result<CapturedImage, CaptureError>;
}
