//! Google Maps HTTP client.
//!
//! Queries the Directions and Places Nearby Search web services and converts
//! the responses to domain types.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::domain::{GeoPoint, Place, PlaceCategory, RouteResult, TravelMode};

use super::convert::{convert_directions, convert_places};
use super::error::OracleError;
use super::types::{DirectionsResponse, NearbySearchResponse};
use super::{PlaceOracle, RoutingOracle};

/// Default base URL for the Google Maps web services.
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Configuration for the Google Maps client.
#[derive(Debug, Clone)]
pub struct GoogleMapsConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GoogleMapsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 20,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Google Maps API client.
///
/// Uses a semaphore to bound concurrent requests. Spacing between requests
/// is the request queue's job, not this client's.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    semaphore: Arc<Semaphore>,
}

impl GoogleMapsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: GoogleMapsConfig) -> Result<Self, OracleError> {
        if config.api_key.trim().is_empty() {
            return Err(OracleError::RequestDenied("API key is empty".to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch a single route from `origin` to `destination`.
    pub async fn directions(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RouteResult, OracleError> {
        let url = format!("{}/directions/json", self.base_url);
        let resp: DirectionsResponse = self
            .get_json(
                &url,
                &[
                    ("origin", origin.to_string()),
                    ("destination", destination.to_string()),
                    ("mode", mode.as_api_str().to_string()),
                ],
            )
            .await?;

        tracing::debug!(
            status = %resp.status,
            %origin,
            %destination,
            mode = mode.as_str(),
            "directions response"
        );
        convert_directions(&resp)
    }

    /// Search for places of one category within `radius_m` of `center`.
    pub async fn nearby(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> Result<Vec<Place>, OracleError> {
        let url = format!("{}/place/nearbysearch/json", self.base_url);
        let resp: NearbySearchResponse = self
            .get_json(
                &url,
                &[
                    ("location", center.to_string()),
                    ("radius", radius_m.to_string()),
                    ("type", category.as_str().to_string()),
                ],
            )
            .await?;

        tracing::debug!(
            status = %resp.status,
            results = resp.results.len(),
            %center,
            radius_m,
            category = category.as_str(),
            "nearby search response"
        );
        convert_places(&resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, OracleError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| OracleError::Api {
                status: "CLIENT_CLOSED".to_string(),
                message: "Semaphore closed".to_string(),
            })?;

        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(OracleError::RequestDenied(format!("HTTP {}", status.as_u16())));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(OracleError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16().to_string(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| OracleError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl RoutingOracle for GoogleMapsClient {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RouteResult, OracleError> {
        self.directions(origin, destination, mode).await
    }
}

impl PlaceOracle for GoogleMapsClient {
    async fn nearby_search(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> Result<Vec<Place>, OracleError> {
        self.nearby(center, radius_m, category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = GoogleMapsConfig::new("key")
            .with_base_url("http://localhost:9999/")
            .with_max_concurrent(2)
            .with_timeout(5);
        assert_eq!(config.api_key, "key");
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 5);

        let client = GoogleMapsClient::new(config).unwrap();
        assert_eq!(client.base_url, "http://localhost:9999");
    }

    #[test]
    fn empty_key_is_denied() {
        let err = GoogleMapsClient::new(GoogleMapsConfig::new("  ")).unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn unreachable_host_is_transient() {
        let config = GoogleMapsConfig::new("key")
            .with_base_url("http://127.0.0.1:1")
            .with_timeout(2);
        let client = GoogleMapsClient::new(config).unwrap();
        let a = GeoPoint::new(51.5, -0.1).unwrap();
        let err = client
            .directions(a, a, TravelMode::Walking)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), crate::oracle::ErrorKind::OracleTransient);
    }
}
