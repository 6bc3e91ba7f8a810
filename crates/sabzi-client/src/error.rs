#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("pricing service unavailable: {0}")]
    Unavailable(String),

    #[error("pricing service returned HTTP {status}")]
    Http { status: u16 },

    #[error("malformed pricing response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for PricingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PricingError::Malformed(err.to_string())
        } else {
            PricingError::Unavailable(err.to_string())
        }
    }
}
