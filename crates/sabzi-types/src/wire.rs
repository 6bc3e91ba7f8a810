//! JSON payloads exchanged with the detection and pricing backends.
//!
//! Unknown fields are ignored everywhere; the detection backend attaches
//! bounding boxes, timestamps and its own line totals that the client does not use.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One detected vegetable as reported by the detection backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRecord {
    pub vegetable: String,
    pub quantity: f64,
    pub confidence: f64,
    #[serde(default)]
    pub price_per_kg: Option<f64>,
    #[serde(default)]
    pub live_price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// `/detect` replies either with an envelope or with a bare record list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DetectResponse {
    Envelope {
        detections: Vec<DetectionRecord>,
        #[serde(default)]
        annotated_image: Option<String>,
    },
    Bare(Vec<DetectionRecord>),
}

impl DetectResponse {
    pub fn into_parts(self) -> (Vec<DetectionRecord>, Option<String>) {
        match self {
            DetectResponse::Envelope {
                detections,
                annotated_image,
            } => (detections, annotated_image.filter(|s| !s.is_empty())),
            DetectResponse::Bare(detections) => (detections, None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VegetablesResponse {
    pub vegetables: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsResponse {
    pub locations: Vec<String>,
    #[serde(default)]
    pub default: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PriceResponse {
    pub price: f64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// One day of the price series, keyed by vegetable name
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceHistoryPoint {
    pub date: String,
    #[serde(flatten)]
    pub prices: BTreeMap<String, f64>,
}
