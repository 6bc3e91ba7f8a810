use std::net::IpAddr;
use std::time::Duration;

use reqwest::{StatusCode, Url};
use sabzi_config::capture::CaptureConfig;
use sabzi_core::{CameraFault, CaptureError, CapturedImage};
use sabzi_types::ImageSource;

use crate::camera::{Camera, StreamConstraints, VideoStream};
use crate::frame::prepare_frame;

/// Treats an HTTP snapshot endpoint (phone or IP camera) as a live stream.
/// Every `grab_frame` fetches one fresh still.
#[derive(Clone)]
pub struct SnapshotCamera {
    url: Option<String>,
    require_secure: bool,
    client: reqwest::Client,
}

impl SnapshotCamera {
    pub fn new(url: Option<String>, require_secure: bool, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            url,
            require_secure,
            client,
        }
    }

    pub fn from_config(config: &CaptureConfig, timeout: Duration) -> Self {
        Self::new(config.camera_url.clone(), config.require_secure, timeout)
    }

    fn resolve_url(&self, constraints: &StreamConstraints) -> Result<Url, CameraFault> {
        let raw = self.url.as_deref().ok_or(CameraFault::Unsupported)?;
        let mut url = Url::parse(raw).map_err(|e| {
            tracing::warn!("[CAMERA] Bad camera URL {}: {}", raw, e);
            CameraFault::Unsupported
        })?;

        match url.scheme() {
            "https" => {}
            "http" if !self.require_secure || is_loopback(&url) => {}
            "http" => return Err(CameraFault::InsecureContext),
            _ => return Err(CameraFault::Unsupported),
        }

        url.query_pairs_mut()
            .append_pair("facing", constraints.facing.as_str());
        Ok(url)
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

fn fault_for_status(status: StatusCode) -> CameraFault {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CameraFault::PermissionDenied,
        _ => CameraFault::DeviceNotFound,
    }
}

#[async_trait::async_trait]
impl Camera for SnapshotCamera {
    async fn open(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, CameraFault> {
        let url = self.resolve_url(constraints)?;
        tracing::debug!("[CAMERA] Probing {}", url);

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            tracing::warn!("[CAMERA] Camera unreachable: {}", e);
            CameraFault::DeviceNotFound
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("[CAMERA] Camera answered {}", status);
            return Err(fault_for_status(status));
        }

        Ok(Box::new(SnapshotStream {
            url,
            client: self.client.clone(),
            constraints: *constraints,
        }))
    }
}

struct SnapshotStream {
    url: Url,
    client: reqwest::Client,
    constraints: StreamConstraints,
}

#[async_trait::async_trait]
impl VideoStream for SnapshotStream {
    async fn grab_frame(&mut self) -> Result<CapturedImage, CaptureError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|_| CameraFault::DeviceNotFound)?;

        let status = response.status();
        if !status.is_success() {
            return Err(fault_for_status(status).into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|_| CameraFault::DeviceNotFound)?;

        let max = (self.constraints.max_width, self.constraints.max_height);
        prepare_frame(
            bytes.to_vec(),
            Some(max),
            self.constraints.jpeg_quality,
            ImageSource::Camera,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;
    use crate::frame::tests::png;

    fn camera(url: &str, require_secure: bool) -> SnapshotCamera {
        SnapshotCamera::new(Some(url.to_string()), require_secure, Duration::from_secs(2))
    }

    async fn open_err(camera: &SnapshotCamera) -> CameraFault {
        match camera.open(&StreamConstraints::default()).await {
            Ok(_) => panic!("camera unexpectedly opened"),
            Err(fault) => fault,
        }
    }

    #[tokio::test]
    async fn missing_url_is_unsupported() {
        let camera = SnapshotCamera::new(None, true, Duration::from_secs(1));
        assert_eq!(open_err(&camera).await, CameraFault::Unsupported);
    }

    #[tokio::test]
    async fn plain_http_to_lan_needs_https() {
        let camera = camera("http://192.168.1.50:8080/shot.jpg", true);
        assert_eq!(open_err(&camera).await, CameraFault::InsecureContext);
    }

    #[tokio::test]
    async fn refused_connection_means_no_device() {
        let camera = camera("http://127.0.0.1:1/shot.jpg", true);
        assert_eq!(open_err(&camera).await, CameraFault::DeviceNotFound);
    }

    #[tokio::test]
    async fn forbidden_means_permission_denied() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/shot.jpg")
            .match_query(Matcher::UrlEncoded("facing".into(), "environment".into()))
            .with_status(403)
            .create_async()
            .await;

        let camera = camera(&format!("{}/shot.jpg", server.url()), true);
        assert_eq!(open_err(&camera).await, CameraFault::PermissionDenied);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn grabbed_frame_is_downscaled_jpeg() {
        let mut server = mockito::Server::new_async().await;
        let _shot = server
            .mock("GET", "/shot.jpg")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "image/png")
            .with_body(png(1280, 960))
            .create_async()
            .await;

        let camera = camera(&format!("{}/shot.jpg", server.url()), true);
        let mut stream = camera.open(&StreamConstraints::default()).await.unwrap();
        let frame = stream.grab_frame().await.unwrap();

        assert_eq!((frame.width(), frame.height()), (640, 480));
        assert_eq!(frame.source(), ImageSource::Camera);
    }

    #[test]
    fn loopback_hosts() {
        assert!(is_loopback(&Url::parse("http://localhost:8080/").unwrap()));
        assert!(is_loopback(&Url::parse("http://127.0.0.1/").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]:9000/").unwrap()));
        assert!(!is_loopback(&Url::parse("http://10.0.0.2/").unwrap()));
    }
}
