use serde::{Deserialize, Serialize};

use crate::{Lookup, parse_var};

fn default_timeout_seconds() -> u64 {
    30
}

/// Where the client is running, which decides the backend hosts
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Deployment {
    /// Desktop browser against services on this machine
    #[default]
    Local,
    /// Phone on the LAN reaching services on the dev machine
    LocalMobile,
    Hosted,
}

impl Deployment {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Some(Deployment::Local),
            "local-mobile" | "mobile" => Some(Deployment::LocalMobile),
            "hosted" | "production" => Some(Deployment::Hosted),
            _ => None,
        }
    }

    pub fn detection_base_url(&self) -> &'static str {
        match self {
            Deployment::Local => "http://localhost:8000",
            Deployment::LocalMobile => "https://192.168.1.100:8000",
            Deployment::Hosted => "https://veggimlbackend.onrender.com",
        }
    }

    pub fn pricing_base_url(&self) -> &'static str {
        match self {
            Deployment::Local => "http://localhost:9000",
            Deployment::LocalMobile => "https://192.168.1.100:9000",
            Deployment::Hosted => "https://veggigoserver.onrender.com",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct NetworkConfig {
    pub deployment: Deployment,
    /// Overrides the deployment's detection service (`/detect`, `/health`)
    pub detection_base_url: Option<String>,
    /// Overrides the deployment's pricing service (`/api/*`, `/price/*`)
    pub pricing_base_url: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            deployment: Deployment::default(),
            detection_base_url: None,
            pricing_base_url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl NetworkConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let deployment = lookup("SABZI_DEPLOYMENT")
            .and_then(|v| Deployment::parse(&v))
            .unwrap_or_default();

        let timeout_seconds = parse_var(lookup, "REQUEST_TIMEOUT_SECONDS")
            .filter(|s: &u64| *s > 0)
            .unwrap_or_else(default_timeout_seconds);

        let mut config = Self {
            deployment,
            detection_base_url: lookup("DETECTION_API_URL"),
            pricing_base_url: lookup("PRICING_API_URL"),
            timeout_seconds,
        };
        config.normalize();
        config
    }

    /// Detection base URL: the override if set, otherwise the deployment's
    pub fn detection_url(&self) -> &str {
        self.detection_base_url
            .as_deref()
            .unwrap_or_else(|| self.deployment.detection_base_url())
    }

    pub fn pricing_url(&self) -> &str {
        self.pricing_base_url
            .as_deref()
            .unwrap_or_else(|| self.deployment.pricing_base_url())
    }

    pub(crate) fn normalize(&mut self) {
        self.detection_base_url = self.detection_base_url.as_deref().and_then(trim_base);
        self.pricing_base_url = self.pricing_base_url.as_deref().and_then(trim_base);
        if self.timeout_seconds == 0 {
            self.timeout_seconds = default_timeout_seconds();
        }
    }
}

fn trim_base(url: &str) -> Option<String> {
    let url = url.trim().trim_end_matches('/');
    (!url.is_empty()).then(|| url.to_string())
}
