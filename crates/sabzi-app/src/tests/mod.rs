//! End-to-end event flow tests against fake camera and backends


use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use sabzi_capture::{Camera, StreamConstraints, VideoStream};
use sabzi_client::{DetectionService, PricingError, PricingService};
use sabzi_config::Config;
use sabzi_core::{AppEvent, CameraFault, CaptureError, CapturedImage, DetectError, UiEvent};
use sabzi_types::{
    DetectResponse, DetectionRecord, ImageSource, Location, LocationsResponse, PriceHistoryPoint,
    ServiceHealth, ToastKind,
};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::detect_context::DetectContext;
use crate::events::event_loop;
use crate::state::AppState;

pub fn record(vegetable: &str, quantity: f64, price_per_kg: Option<f64>) -> DetectionRecord {
    DetectionRecord {
        vegetable: vegetable.to_string(),
        quantity,
        confidence: 0.95,
        price_per_kg,
        live_price: None,
        unit: None,
    }
}

/// A PNG on disk for `LoadFile`
pub fn png_file(width: u32, height: u32) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([40, 160, 60]));
    let mut png = std::io::Cursor::new(Vec::new());
    img.write_to(&mut png, image::ImageFormat::Png).unwrap();
    std::io::Write::write_all(&mut file, png.get_ref()).unwrap();
    file
}

pub fn detections(records: Vec<DetectionRecord>) -> Result<DetectResponse, DetectError> {
    Ok(DetectResponse::Envelope {
        detections: records,
        annotated_image: None,
    })
}

pub struct FakeCamera {
    fault: Option<CameraFault>,
}

impl FakeCamera {
    pub fn working() -> Self {
        Self { fault: None }
    }

    pub fn failing(fault: CameraFault) -> Self {
        Self { fault: Some(fault) }
    }
}

struct FakeStream;

#[async_trait::async_trait]
impl VideoStream for FakeStream {
    async fn grab_frame(&mut self) -> Result<CapturedImage, CaptureError> {
        Ok(CapturedImage::new(
            vec![0xFF, 0xD8, 0xFF, 0xD9],
            640,
            480,
            ImageSource::Camera,
        ))
    }
}

#[async_trait::async_trait]
impl Camera for FakeCamera {
    async fn open(
        &self,
        _constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraFault> {
        match self.fault {
            Some(fault) => Err(fault),
            None => Ok(Box::new(FakeStream)),
        }
    }
}

/// Replies from a script; optionally holds each request until released
pub struct FakeDetection {
    replies: Mutex<VecDeque<Result<DetectResponse, DetectError>>>,
    gate: Option<Arc<Semaphore>>,
    calls: AtomicUsize,
}

impl FakeDetection {
    pub fn replying(replies: Vec<Result<DetectResponse, DetectError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            gate: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DetectionService for FakeDetection {
    async fn detect(
        &self,
        _image: &CapturedImage,
        _location: &Location,
    ) -> Result<DetectResponse, DetectError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| detections(Vec::new()))
    }

    async fn health(&self) -> Result<ServiceHealth, DetectError> {
        Ok(ServiceHealth::default())
    }
}

/// Prices keyed by (vegetable, location); anything missing is an outage
#[derive(Default)]
pub struct FakePricing {
    prices: HashMap<(String, String), f64>,
    locations: Vec<String>,
}

impl FakePricing {
    pub fn with_price(mut self, vegetable: &str, location: &str, price: f64) -> Self {
        self.prices
            .insert((vegetable.to_string(), location.to_string()), price);
        if !self.locations.iter().any(|l| l == location) {
            self.locations.push(location.to_string());
        }
        self
    }
}

#[async_trait::async_trait]
impl PricingService for FakePricing {
    async fn vegetables(&self) -> Result<Vec<String>, PricingError> {
        let mut names: Vec<String> = self.prices.keys().map(|(v, _)| v.clone()).collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn locations(&self) -> Result<LocationsResponse, PricingError> {
        Ok(LocationsResponse {
            locations: self.locations.clone(),
            default: None,
        })
    }

    async fn price(&self, vegetable: &str, location: &Location) -> Result<f64, PricingError> {
        self.prices
            .get(&(vegetable.to_string(), location.to_string()))
            .copied()
            .ok_or_else(|| PricingError::Unavailable("connection refused".to_string()))
    }

    async fn price_history(&self) -> Result<Vec<PriceHistoryPoint>, PricingError> {
        Ok(Vec::new())
    }
}

/// A running event loop wired to fakes
pub struct Harness {
    pub state: Arc<AppState>,
    pub detection: Arc<FakeDetection>,
    ui_to_app: AsyncSender<AppEvent>,
    app_to_ui: AsyncReceiver<AppEvent>,
    event_loop: JoinHandle<anyhow::Result<()>>,
}

impl Harness {
    pub fn new(camera: FakeCamera, detection: FakeDetection, pricing: FakePricing) -> Self {
        let detection = Arc::new(detection);
        let state = Arc::new(AppState::new(
            Config::default(),
            Arc::new(camera),
            detection.clone(),
            Arc::new(pricing),
        ));

        let (app_tx, app_rx) = kanal::bounded_async(256);
        let (ui_tx, ui_rx) = kanal::bounded_async(64);
        let ctx = DetectContext::new(state.clone(), app_tx, ui_tx.clone());
        let event_loop = tokio::spawn(event_loop(ctx, ui_rx));

        Self {
            state,
            detection,
            ui_to_app: ui_tx,
            app_to_ui: app_rx,
            event_loop,
        }
    }

    pub async fn send(&self, event: AppEvent) {
        self.ui_to_app.send(event).await.unwrap();
    }

    /// UI events up to and including the first one matching `done`
    pub async fn until(&self, done: impl Fn(&AppEvent) -> bool) -> Vec<AppEvent> {
        let mut seen = Vec::new();
        loop {
            let event = tokio::time::timeout(Duration::from_secs(5), self.app_to_ui.recv())
                .await
                .expect("timed out waiting for UI event")
                .unwrap();
            let finished = done(&event);
            seen.push(event);
            if finished {
                return seen;
            }
        }
    }

    /// UI events up to and including the toast with `message`
    pub async fn until_toast(&self, message: &str) -> Vec<AppEvent> {
        self.until(|event| matches!(event, AppEvent::Notify { message: m, .. } if m == message))
            .await
    }

    /// Camera started and one frame captured
    pub async fn capture(&self) {
        self.send(AppEvent::RequestCamera).await;
        self.until_toast("Camera started successfully").await;
        self.send(AppEvent::CaptureFrame).await;
        self.until(|event| matches!(event, AppEvent::ControlsChanged(c) if c.detect))
            .await;
    }

    /// Close the app and wait for the event loop to finish
    pub async fn close(self) -> Vec<AppEvent> {
        self.send(AppEvent::UiEvent(UiEvent::Close)).await;
        let seen = self
            .until(|event| matches!(event, AppEvent::UiEvent(UiEvent::Close)))
            .await;
        tokio::time::timeout(Duration::from_secs(5), self.event_loop)
            .await
            .expect("event loop did not stop")
            .unwrap()
            .unwrap();
        seen
    }
}

pub fn toasts(events: &[AppEvent]) -> Vec<(String, ToastKind)> {
    events
        .iter()
        .filter_map(|event| match event {
            AppEvent::Notify { message, kind } => Some((message.clone(), *kind)),
            _ => None,
        })
        .collect()
}
