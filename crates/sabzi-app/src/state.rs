use std::sync::Arc;
use std::time::Duration;

use sabzi_capture::{Camera, SnapshotCamera, StreamConstraints, VideoStream};
use sabzi_client::{
    DetectionOrchestrator, DetectionService, HttpDetectionService, HttpPricingService,
    PricingService,
};
use sabzi_config::Config;
use sabzi_core::Session;
use sabzi_types::Location;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;

use crate::status::AppStatus;

/// What the pricing service says it supports, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub vegetables: Vec<String>,
    pub locations: Vec<Location>,
}

impl Catalog {
    /// Catalog spelling of a location the user typed
    pub fn find_location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.matches(name))
    }
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub session: Mutex<Session>,
    pub camera: Arc<dyn Camera>,
    pub stream: Mutex<Option<Box<dyn VideoStream>>>,
    pub orchestrator: DetectionOrchestrator,
    pub catalog: RwLock<Catalog>,
    pub status: AppStatus,
    pub in_flight: Mutex<Option<JoinHandle<()>>>,
    /// Exit once the first detection settles
    pub one_shot: bool,
}

impl AppState {
    pub fn new(
        config: Config,
        camera: Arc<dyn Camera>,
        detection: Arc<dyn DetectionService>,
        pricing: Arc<dyn PricingService>,
    ) -> Self {
        let session = Session::new(config.pricing.default_location.clone());
        let orchestrator =
            DetectionOrchestrator::new(detection, pricing, config.pricing.fallback_price_per_kg);

        Self {
            config: Arc::new(RwLock::new(config)),
            session: Mutex::new(session),
            camera,
            stream: Mutex::new(None),
            orchestrator,
            catalog: RwLock::new(Catalog::default()),
            status: AppStatus::new(),
            in_flight: Mutex::new(None),
            one_shot: false,
        }
    }

    /// Wire the HTTP backends described by `config`
    pub fn from_config(config: Config) -> Self {
        let timeout = Duration::from_secs(config.network.timeout_seconds);
        let camera = Arc::new(SnapshotCamera::from_config(&config.capture, timeout));
        let detection = Arc::new(HttpDetectionService::new(
            config.network.detection_url(),
            timeout,
        ));
        let pricing = Arc::new(HttpPricingService::new(
            config.network.pricing_url(),
            timeout,
        ));

        Self::new(config, camera, detection, pricing)
    }

    pub fn with_one_shot(mut self, one_shot: bool) -> Self {
        self.one_shot = one_shot;
        self
    }

    pub async fn stream_constraints(&self) -> StreamConstraints {
        StreamConstraints::from_config(&self.config.read().await.capture)
    }

    pub fn pricing(&self) -> &Arc<dyn PricingService> {
        self.orchestrator.pricing()
    }
}
