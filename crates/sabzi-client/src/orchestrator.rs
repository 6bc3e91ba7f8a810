use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sabzi_core::pricing::{needs_quote, price_items, resolve_unit_price};
use sabzi_core::{CapturedImage, DetectError, DetectionOutcome, ResultSet};
use sabzi_types::Location;

use crate::detection::DetectionService;
use crate::pricing::PricingService;

/// Turns one captured image into a priced [`ResultSet`].
///
/// Single-flight is enforced by the session's `Detecting` state before a
/// request ever reaches this type.
#[derive(Clone)]
pub struct DetectionOrchestrator {
    detection: Arc<dyn DetectionService>,
    pricing: Arc<dyn PricingService>,
    fallback_price: f64,
}

impl DetectionOrchestrator {
    pub fn new(
        detection: Arc<dyn DetectionService>,
        pricing: Arc<dyn PricingService>,
        fallback_price: f64,
    ) -> Self {
        Self {
            detection,
            pricing,
            fallback_price,
        }
    }

    pub fn detection(&self) -> &Arc<dyn DetectionService> {
        &self.detection
    }

    pub fn pricing(&self) -> &Arc<dyn PricingService> {
        &self.pricing
    }

    pub async fn detect(
        &self,
        image: &CapturedImage,
        location: &Location,
    ) -> Result<DetectionOutcome, DetectError> {
        let response = self.detection.detect(image, location).await?;
        let (records, annotated) = response.into_parts();
        tracing::debug!("[DETECT] Backend returned {} records", records.len());

        let annotated_image = annotated
            .map(|encoded| decode_annotated(&encoded))
            .transpose()?;

        let mut pricing_unavailable = false;
        let mut prices = Vec::with_capacity(records.len());

        for record in &records {
            let quote = if needs_quote(record) && !record.vegetable.trim().is_empty() {
                match self.pricing.price(&record.vegetable, location).await {
                    Ok(price) => Some(price),
                    Err(e) => {
                        tracing::warn!(
                            "[DETECT] No live price for {} in {}: {}",
                            record.vegetable,
                            location,
                            e
                        );
                        pricing_unavailable = true;
                        None
                    }
                }
            } else {
                None
            };

            prices.push(resolve_unit_price(record, quote, self.fallback_price));
        }

        let items = price_items(&records, &prices)?;

        Ok(DetectionOutcome {
            result_set: ResultSet::new(items, annotated_image, location.clone()),
            pricing_unavailable,
        })
    }
}

/// Base64 JPEG, optionally as a `data:` URL
fn decode_annotated(encoded: &str) -> Result<Vec<u8>, DetectError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, data)) if prefix.starts_with("data:") => data,
        _ => encoded,
    };

    STANDARD
        .decode(payload.trim())
        .map_err(|e| DetectError::MalformedResponse(format!("annotated image: {e}")))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use sabzi_core::PriceSource;
    use sabzi_core::pricing::round2;
    use sabzi_types::{
        DetectResponse, DetectionRecord, ImageSource, LocationsResponse, PriceHistoryPoint,
        ServiceHealth,
    };

    use super::*;
    use crate::error::PricingError;

    struct FakeDetection {
        response: Result<DetectResponse, DetectError>,
        calls: AtomicUsize,
    }

    impl FakeDetection {
        fn replying(response: Result<DetectResponse, DetectError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
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
            self.response.clone()
        }

        async fn health(&self) -> Result<ServiceHealth, DetectError> {
            Ok(ServiceHealth::default())
        }
    }

    #[derive(Default)]
    struct FakePricing {
        price: Option<f64>,
        asked: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl PricingService for FakePricing {
        async fn vegetables(&self) -> Result<Vec<String>, PricingError> {
            Ok(vec![])
        }

        async fn locations(&self) -> Result<LocationsResponse, PricingError> {
            Err(PricingError::Unavailable("offline".into()))
        }

        async fn price(&self, vegetable: &str, location: &Location) -> Result<f64, PricingError> {
            self.asked
                .lock()
                .unwrap()
                .push((vegetable.to_string(), location.to_string()));
            self.price
                .ok_or_else(|| PricingError::Unavailable("offline".into()))
        }

        async fn price_history(&self) -> Result<Vec<PriceHistoryPoint>, PricingError> {
            Ok(vec![])
        }
    }

    fn record(vegetable: &str, quantity: f64, price_per_kg: Option<f64>) -> DetectionRecord {
        DetectionRecord {
            vegetable: vegetable.to_string(),
            quantity,
            confidence: 0.95,
            price_per_kg,
            live_price: None,
            unit: None,
        }
    }

    fn image() -> CapturedImage {
        CapturedImage::new(vec![0xFF, 0xD8], 640, 480, ImageSource::Camera)
    }

    fn orchestrator(
        detection: Arc<FakeDetection>,
        pricing: Arc<FakePricing>,
    ) -> DetectionOrchestrator {
        DetectionOrchestrator::new(detection, pricing, 30.0)
    }

    #[tokio::test]
    async fn priced_tomato_bill() {
        let detection = FakeDetection::replying(Ok(DetectResponse::Envelope {
            detections: vec![record("tomato", 2.0, Some(30.0))],
            annotated_image: Some("aGVsbG8=".to_string()),
        }));
        let pricing = Arc::new(FakePricing::default());

        let outcome = orchestrator(detection.clone(), pricing.clone())
            .detect(&image(), &Location::default())
            .await
            .unwrap();

        let totals = outcome.result_set.totals();
        assert_eq!(round2(totals.subtotal), 60.0);
        assert_eq!(round2(totals.tax), 6.0);
        assert_eq!(round2(totals.total), 66.0);
        assert_eq!(outcome.result_set.annotated_image(), Some(&b"hello"[..]));
        assert!(!outcome.pricing_unavailable);
        assert!(pricing.asked.lock().unwrap().is_empty());
        assert_eq!(detection.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn zero_detections_is_empty_success() {
        let detection = FakeDetection::replying(Ok(DetectResponse::Bare(vec![])));
        let outcome = orchestrator(detection, Arc::new(FakePricing::default()))
            .detect(&image(), &Location::default())
            .await
            .unwrap();
        assert!(outcome.result_set.is_empty());
        assert_eq!(outcome.result_set.totals().total, 0.0);
    }

    #[tokio::test]
    async fn unpriced_record_gets_live_quote_for_location() {
        let detection = FakeDetection::replying(Ok(DetectResponse::Bare(vec![record(
            "carrot", 1.5, None,
        )])));
        let pricing = Arc::new(FakePricing {
            price: Some(40.0),
            ..FakePricing::default()
        });

        let mumbai = Location::parse("Mumbai").unwrap();
        let outcome = orchestrator(detection, pricing.clone())
            .detect(&image(), &mumbai)
            .await
            .unwrap();

        let item = &outcome.result_set.items()[0];
        assert_eq!(item.price_per_kg(), 40.0);
        assert_eq!(item.price_source(), PriceSource::Live);
        assert_eq!(item.line_total(), 60.0);
        assert_eq!(
            pricing.asked.lock().unwrap().as_slice(),
            [("carrot".to_string(), "Mumbai".to_string())]
        );
        assert_eq!(outcome.result_set.location(), &mumbai);
    }

    #[tokio::test]
    async fn pricing_outage_falls_back() {
        let detection = FakeDetection::replying(Ok(DetectResponse::Bare(vec![
            record("carrot", 1.0, None),
            record("peas", 0.5, None),
        ])));

        let outcome = orchestrator(detection, Arc::new(FakePricing::default()))
            .detect(&image(), &Location::default())
            .await
            .unwrap();

        assert!(outcome.pricing_unavailable);
        for item in outcome.result_set.items() {
            assert_eq!(item.price_per_kg(), 30.0);
            assert_eq!(item.price_source(), PriceSource::Fallback);
        }
    }

    #[tokio::test]
    async fn backend_errors_pass_through() {
        let detection = FakeDetection::replying(Err(DetectError::Http { status: 500 }));
        let err = orchestrator(detection, Arc::new(FakePricing::default()))
            .detect(&image(), &Location::default())
            .await
            .unwrap_err();
        assert_eq!(err, DetectError::Http { status: 500 });
    }

    #[tokio::test]
    async fn invalid_record_is_malformed_response() {
        let detection = FakeDetection::replying(Ok(DetectResponse::Bare(vec![record(
            "tomato", -1.0, Some(30.0),
        )])));
        let err = orchestrator(detection, Arc::new(FakePricing::default()))
            .detect(&image(), &Location::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DetectError::MalformedResponse(_)));
    }

    #[test]
    fn annotated_image_accepts_data_url() {
        assert_eq!(
            decode_annotated("data:image/jpeg;base64,aGVsbG8=").unwrap(),
            b"hello"
        );
        assert!(matches!(
            decode_annotated("%%%"),
            Err(DetectError::MalformedResponse(_))
        ));
    }
}
