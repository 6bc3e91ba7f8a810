mod detection;
mod error;
mod orchestrator;
mod pricing;

pub use detection::{DetectionService, HttpDetectionService};
pub use error::PricingError;
pub use orchestrator::DetectionOrchestrator;
pub use pricing::{HttpPricingService, PricingService};

use std::time::Duration;

/// Shared reqwest client with the configured request timeout
pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}
