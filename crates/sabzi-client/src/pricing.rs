use std::time::Duration;

use sabzi_types::{
    Location, LocationsResponse, PriceHistoryPoint, PriceResponse, VegetablesResponse,
};

use crate::error::PricingError;
use crate::http_client;

/// Location-aware price lookups
#[async_trait::async_trait]
pub trait PricingService: Send + Sync {
    async fn vegetables(&self) -> Result<Vec<String>, PricingError>;

    async fn locations(&self) -> Result<LocationsResponse, PricingError>;

    /// Current per-kg price of one vegetable at one location
    async fn price(&self, vegetable: &str, location: &Location) -> Result<f64, PricingError>;

    async fn price_history(&self) -> Result<Vec<PriceHistoryPoint>, PricingError>;
}

#[derive(Clone)]
pub struct HttpPricingService {
    base_url: String,
    client: reqwest::Client,
}

impl HttpPricingService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: http_client(timeout),
        }
    }

    /// `segments` are appended to the base URL one by one, percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, PricingError> {
        let invalid = || PricingError::Unavailable(format!("invalid base URL {}", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T, PricingError>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        let url = self.endpoint(segments)?;
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PricingError::Http {
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(PricingError::from)
    }
}

#[async_trait::async_trait]
impl PricingService for HttpPricingService {
    async fn vegetables(&self) -> Result<Vec<String>, PricingError> {
        let response: VegetablesResponse = self.get(&["api", "vegetables"], &[]).await?;
        Ok(response.vegetables)
    }

    async fn locations(&self) -> Result<LocationsResponse, PricingError> {
        self.get(&["api", "locations"], &[]).await
    }

    async fn price(&self, vegetable: &str, location: &Location) -> Result<f64, PricingError> {
        let name = vegetable.trim().to_lowercase();
        let response: PriceResponse = self
            .get(&["price", name.as_str()], &[("location", location.as_str())])
            .await?;

        if response.price.is_finite() && response.price >= 0.0 {
            Ok(response.price)
        } else {
            Err(PricingError::Malformed(format!(
                "price {} for {}",
                response.price, vegetable
            )))
        }
    }

    async fn price_history(&self) -> Result<Vec<PriceHistoryPoint>, PricingError> {
        self.get(&["api", "price-history"], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn service(server: &mockito::Server) -> HttpPricingService {
        HttpPricingService::new(server.url(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn price_passes_location_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/price/tomato")
            .match_query(Matcher::UrlEncoded("location".into(), "Mumbai".into()))
            .with_status(200)
            .with_body(r#"{"price": 42.5, "unit": "kg"}"#)
            .create_async()
            .await;

        let price = service(&server)
            .price("Tomato", &Location::parse("Mumbai").unwrap())
            .await
            .unwrap();
        assert_eq!(price, 42.5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn vegetable_name_is_one_encoded_segment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/price/bell%20pepper%2Fred%3F")
            .match_query(Matcher::UrlEncoded("location".into(), "Delhi".into()))
            .with_status(200)
            .with_body(r#"{"price": 80}"#)
            .create_async()
            .await;

        let price = service(&server)
            .price("Bell Pepper/Red?", &Location::default())
            .await
            .unwrap();
        assert_eq!(price, 80.0);
        mock.assert_async().await;
    }

    #[test]
    fn base_url_path_is_kept() {
        let service =
            HttpPricingService::new("http://prices.local/v2/", Duration::from_secs(1));
        let url = service.endpoint(&["price", "okra"]).unwrap();
        assert_eq!(url.as_str(), "http://prices.local/v2/price/okra");
    }

    #[test]
    fn unusable_base_url_is_unavailable() {
        let service = HttpPricingService::new("not a url", Duration::from_secs(1));
        let err = service.endpoint(&["api", "locations"]).unwrap_err();
        assert!(matches!(err, PricingError::Unavailable(_)));
    }

    #[tokio::test]
    async fn negative_price_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _price = server
            .mock("GET", "/price/onion")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"price": -3}"#)
            .create_async()
            .await;

        let err = service(&server)
            .price("onion", &Location::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PricingError::Malformed(_)));
    }

    #[tokio::test]
    async fn not_found_is_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _price = server
            .mock("GET", "/price/dragonfruit")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = service(&server)
            .price("dragonfruit", &Location::default())
            .await
            .unwrap_err();
        assert_eq!(err, PricingError::Http { status: 404 });
    }

    #[tokio::test]
    async fn catalog_endpoints() {
        let mut server = mockito::Server::new_async().await;
        let _vegetables = server
            .mock("GET", "/api/vegetables")
            .with_status(200)
            .with_body(r#"{"vegetables": ["tomato", "onion"]}"#)
            .create_async()
            .await;
        let _locations = server
            .mock("GET", "/api/locations")
            .with_status(200)
            .with_body(r#"{"locations": ["Delhi", "Mumbai"], "default": "Delhi"}"#)
            .create_async()
            .await;
        let _history = server
            .mock("GET", "/api/price-history")
            .with_status(200)
            .with_body(r#"[{"date": "2024-01-01", "tomato": 30, "onion": 35.5}]"#)
            .create_async()
            .await;

        let service = service(&server);
        assert_eq!(service.vegetables().await.unwrap(), ["tomato", "onion"]);
        assert_eq!(service.locations().await.unwrap().locations.len(), 2);

        let history = service.price_history().await.unwrap();
        assert_eq!(history[0].date, "2024-01-01");
        assert_eq!(history[0].prices.get("onion"), Some(&35.5));
    }

    #[tokio::test]
    async fn unreachable_pricing_is_unavailable() {
        let service = HttpPricingService::new("http://127.0.0.1:1", Duration::from_secs(2));
        let err = service.vegetables().await.unwrap_err();
        assert!(matches!(err, PricingError::Unavailable(_)));
    }
}
