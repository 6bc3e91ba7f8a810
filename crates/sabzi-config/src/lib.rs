use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use self::capture::CaptureConfig;
use self::network::NetworkConfig;
use self::pricing::PricingConfig;
use self::ui::UiConfig;

pub mod capture;
pub mod network;
pub mod pricing;
pub mod ui;

pub use network::Deployment;

/// Environment lookup used while building a config
pub type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub capture: CaptureConfig,
    pub pricing: PricingConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Build from process environment, falling back to defaults
    pub fn new() -> Self {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        Config {
            network: NetworkConfig::from_lookup(lookup),
            capture: CaptureConfig::from_lookup(lookup),
            pricing: PricingConfig::from_lookup(lookup),
            ui: UiConfig::from_lookup(lookup),
        }
    }

    /// Put out-of-range values back to their defaults and drop blank URL
    /// overrides. Deserialized profiles skip the checks `from_lookup` does.
    pub fn normalize(mut self) -> Self {
        self.network.normalize();
        self.capture.normalize();
        self.pricing.normalize();
        self
    }
}

/// Parse an environment value, ignoring anything that doesn't parse
pub(crate) fn parse_var<T: FromStr>(lookup: Lookup<'_>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
