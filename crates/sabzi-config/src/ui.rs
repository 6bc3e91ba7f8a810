use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Lookup, parse_var};

fn default_toast_display_ms() -> u64 {
    4000
}

fn default_toast_fade_in_ms() -> u64 {
    100
}

fn default_toast_fade_out_ms() -> u64 {
    300
}

fn default_annotated_image_path() -> PathBuf {
    env::temp_dir().join("sabzi-annotated.jpg")
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct UiConfig {
    #[serde(default = "default_toast_display_ms")]
    pub toast_display_ms: u64,
    #[serde(default = "default_toast_fade_in_ms")]
    pub toast_fade_in_ms: u64,
    #[serde(default = "default_toast_fade_out_ms")]
    pub toast_fade_out_ms: u64,
    /// Where the annotated detection image gets written
    #[serde(default = "default_annotated_image_path")]
    pub annotated_image_path: PathBuf,
    /// Force ANSI colors on or off; `None` means detect a terminal
    pub color: Option<bool>,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            toast_display_ms: default_toast_display_ms(),
            toast_fade_in_ms: default_toast_fade_in_ms(),
            toast_fade_out_ms: default_toast_fade_out_ms(),
            annotated_image_path: default_annotated_image_path(),
            color: None,
        }
    }
}

impl UiConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Self {
            toast_display_ms: parse_var(lookup, "TOAST_DISPLAY_MS")
                .unwrap_or_else(default_toast_display_ms),
            toast_fade_in_ms: parse_var(lookup, "TOAST_FADE_IN_MS")
                .unwrap_or_else(default_toast_fade_in_ms),
            toast_fade_out_ms: parse_var(lookup, "TOAST_FADE_OUT_MS")
                .unwrap_or_else(default_toast_fade_out_ms),
            annotated_image_path: lookup("ANNOTATED_IMAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(default_annotated_image_path),
            color: parse_var(lookup, "COLOR"),
        }
    }

    pub fn toast_timing(&self) -> (Duration, Duration, Duration) {
        (
            Duration::from_millis(self.toast_fade_in_ms),
            Duration::from_millis(self.toast_display_ms),
            Duration::from_millis(self.toast_fade_out_ms),
        )
    }
}
