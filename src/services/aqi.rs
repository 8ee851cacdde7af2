//! WAQI (aqicn.org) air quality client.
//!
//! Fetches the current AQI for the monitoring station nearest to a
//! coordinate pair. See: https://aqicn.org/json-api/doc/

use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;

const WAQI_API_URL: &str = "https://api.waqi.info";

/// Timeout for each outbound AQI request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// An air quality reading. `aqi` is `None` when the provider reports a
/// non-"ok" status or a non-numeric index (WAQI uses "-" for unknown).
#[derive(Debug, Clone, Copy)]
pub struct AirQualityReading {
    pub aqi: Option<i64>,
}

// --- WAQI JSON response types ---

#[derive(Debug, Deserialize)]
struct WaqiResponse {
    status: String,
    // An object on success, an error string otherwise; inside the object,
    // `aqi` is numeric when known and the string "-" otherwise.
    data: Option<serde_json::Value>,
}

/// Client for the WAQI geolocated feed.
#[derive(Debug, Clone)]
pub struct AqiClient {
    client: reqwest::Client,
    base_url: String,
}

impl AqiClient {
    pub fn new() -> Self {
        Self::with_base_url(WAQI_API_URL)
    }

    /// Construct against a non-default base URL (used by tests to point at a
    /// mock server).
    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the AQI for the station nearest to the given coordinates.
    ///
    /// A provider-side "no data" answer is a successful reading with
    /// `aqi = None`; only transport and payload failures are errors.
    pub async fn fetch(&self, token: &str, lat: f64, lon: f64) -> Result<AirQualityReading, AppError> {
        let url = format!("{}/feed/geo:{};{}/", self.base_url, lat, lon);

        let response = self
            .client
            .get(&url)
            .query(&[("token", token)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("WAQI request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "WAQI returned HTTP {}",
                response.status()
            )));
        }

        let body: WaqiResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("WAQI JSON parse error: {}", e)))?;

        if body.status != "ok" {
            tracing::warn!("WAQI reported status '{}', treating AQI as unknown", body.status);
            return Ok(AirQualityReading { aqi: None });
        }

        let aqi = body
            .data
            .as_ref()
            .and_then(|d| d.get("aqi"))
            .and_then(|v| v.as_i64());

        Ok(AirQualityReading { aqi })
    }
}
