use std::time::Duration;

use reqwest::multipart::{Form, Part};
use sabzi_core::{CapturedImage, DetectError};
use sabzi_types::{DetectResponse, Location, ServiceHealth};

use crate::http_client;

/// Remote vegetable detector
#[async_trait::async_trait]
pub trait DetectionService: Send + Sync {
    /// Submit one image and wait for the full response
    async fn detect(
        &self,
        image: &CapturedImage,
        location: &Location,
    ) -> Result<DetectResponse, DetectError>;

    async fn health(&self) -> Result<ServiceHealth, DetectError>;
}

#[derive(Clone)]
pub struct HttpDetectionService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDetectionService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout),
        }
    }

    async fn read_json<T>(response: reqwest::Response) -> Result<T, DetectError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let status = response.status();
        if !status.is_success() {
            return Err(DetectError::Http {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DetectError::Network(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| DetectError::MalformedResponse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl DetectionService for HttpDetectionService {
    async fn detect(
        &self,
        image: &CapturedImage,
        location: &Location,
    ) -> Result<DetectResponse, DetectError> {
        let part = Part::bytes(image.jpeg().to_vec())
            .file_name(image.file_name())
            .mime_str("image/jpeg")
            .map_err(|e| DetectError::Network(e.to_string()))?;

        let form = Form::new()
            .part("image", part)
            .text("location", location.as_str().to_string());

        let response = self
            .client
            .post(format!("{}/detect", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| DetectError::Network(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn health(&self) -> Result<ServiceHealth, DetectError> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| DetectError::Network(e.to_string()))?;

        Self::read_json(response).await
    }
}
