//! Nominatim geocoding client.
//!
//! Resolves a free-text place name to coordinates using the OpenStreetMap
//! Nominatim search API. Only the first (best) match is used.
//! See: https://nominatim.org/release-docs/latest/api/Search/

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;

const NOMINATIM_API_URL: &str = "https://nominatim.openstreetmap.org";

/// Timeout for each outbound geocoding request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geographic coordinates in WGS84.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A single nominatim search result. lat/lon arrive as strings.
#[derive(Debug, Deserialize)]
struct NominatimResult {
    lat: String,
    lon: String,
}

/// Client for the nominatim search API.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl GeocodeClient {
    pub fn new(user_agent: &str) -> Self {
        Self::with_base_url(NOMINATIM_API_URL, user_agent)
    }

    /// Construct against a non-default base URL (used by tests to point at a
    /// mock server).
    pub fn with_base_url(base_url: &str, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: user_agent.to_string(),
        }
    }

    /// Resolve a place name to the coordinates of its first match.
    pub async fn geocode(&self, location: &str) -> Result<Coordinates, AppError> {
        let url = format!("{}/search", self.base_url);

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| AppError::Upstream(format!("Invalid User-Agent: {}", e)))?,
        );

        let response = self
            .client
            .get(&url)
            .query(&[("format", "json"), ("q", location)])
            .headers(headers)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("nominatim request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "nominatim returned HTTP {}",
                response.status()
            )));
        }

        let results: Vec<NominatimResult> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("nominatim JSON parse error: {}", e)))?;

        let first = results
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Upstream(format!("location not found: {}", location)))?;

        let lat: f64 = first
            .lat
            .parse()
            .map_err(|e| AppError::Upstream(format!("nominatim returned invalid lat: {}", e)))?;
        let lon: f64 = first
            .lon
            .parse()
            .map_err(|e| AppError::Upstream(format!("nominatim returned invalid lon: {}", e)))?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(AppError::Upstream(format!(
                "nominatim returned out-of-range coordinates: ({}, {})",
                lat, lon
            )));
        }

        Ok(Coordinates { lat, lon })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_geocode_first_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("format", "json"))
            .and(query_param("q", "Zurich"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "47.3769", "lon": "8.5417", "display_name": "Zurich, Switzerland" },
                { "lat": "32.9", "lon": "-96.6", "display_name": "Zurich, Texas" }
            ])))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(&server.uri(), "test-agent/1.0");
        let coords = client.geocode("Zurich").await.unwrap();
        assert_eq!(coords.lat, 47.3769);
        assert_eq!(coords.lon, 8.5417);
    }

    #[tokio::test]
    async fn test_geocode_no_match_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(&server.uri(), "test-agent/1.0");
        let err = client.geocode("Nowhereville").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_geocode_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(&server.uri(), "test-agent/1.0");
        let err = client.geocode("Zurich").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    async fn test_geocode_invalid_lat() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "lat": "not-a-number", "lon": "8.5417" }
            ])))
            .mount(&server)
            .await;

        let client = GeocodeClient::with_base_url(&server.uri(), "test-agent/1.0");
        let err = client.geocode("Zurich").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }
}
