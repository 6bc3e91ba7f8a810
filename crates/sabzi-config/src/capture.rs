use serde::{Deserialize, Serialize};

use crate::{Lookup, parse_var};

fn default_require_secure() -> bool {
    true
}

fn default_jpeg_quality() -> u8 {
    80
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct CaptureConfig {
    /// Snapshot endpoint of a phone/IP camera, e.g. `http://192.168.1.50:8080/shot.jpg`
    pub camera_url: Option<String>,
    /// Refuse plain-http cameras that aren't on loopback
    #[serde(default = "default_require_secure")]
    pub require_secure: bool,
    /// Small screens capture at 480x360 instead of 640x480
    pub constrained_display: bool,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            camera_url: None,
            require_secure: default_require_secure(),
            constrained_display: false,
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

impl CaptureConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let camera_url = lookup("CAMERA_URL").filter(|v| !v.trim().is_empty());

        let require_secure =
            parse_var(lookup, "CAMERA_REQUIRE_SECURE").unwrap_or_else(default_require_secure);

        let constrained_display = parse_var(lookup, "CONSTRAINED_DISPLAY").unwrap_or(false);

        let jpeg_quality = parse_var(lookup, "JPEG_QUALITY")
            .filter(|q: &u8| valid_quality(*q))
            .unwrap_or_else(default_jpeg_quality);

        Self {
            camera_url,
            require_secure,
            constrained_display,
            jpeg_quality,
        }
    }

    pub(crate) fn normalize(&mut self) {
        if !valid_quality(self.jpeg_quality) {
            self.jpeg_quality = default_jpeg_quality();
        }
        if self.camera_url.as_deref().is_some_and(|v| v.trim().is_empty()) {
            self.camera_url = None;
        }
    }

    /// Largest frame the capture step keeps, in pixels
    pub fn max_frame_size(&self) -> (u32, u32) {
        if self.constrained_display {
            (480, 360)
        } else {
            (640, 480)
        }
    }
}

fn valid_quality(quality: u8) -> bool {
    (1..=100).contains(&quality)
}
