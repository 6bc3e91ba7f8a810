use sabzi_types::Location;
use serde::{Deserialize, Serialize};

use crate::{Lookup, parse_var};

fn default_fallback_price() -> f64 {
    30.0
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct PricingConfig {
    /// Unit price used when the pricing service can't be reached
    #[serde(default = "default_fallback_price")]
    pub fallback_price_per_kg: f64,
    pub default_location: Location,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            fallback_price_per_kg: default_fallback_price(),
            default_location: Location::default(),
        }
    }
}

impl PricingConfig {
    pub fn from_lookup(lookup: Lookup<'_>) -> Self {
        let fallback_price_per_kg = parse_var(lookup, "FALLBACK_PRICE_PER_KG")
            .filter(|p: &f64| valid_price(*p))
            .unwrap_or_else(default_fallback_price);

        let default_location = lookup("DEFAULT_LOCATION")
            .and_then(|v| Location::parse(&v))
            .unwrap_or_default();

        Self {
            fallback_price_per_kg,
            default_location,
        }
    }

    pub(crate) fn normalize(&mut self) {
        if !valid_price(self.fallback_price_per_kg) {
            self.fallback_price_per_kg = default_fallback_price();
        }
    }
}

fn valid_price(price: f64) -> bool {
    price.is_finite() && price >= 0.0
}
