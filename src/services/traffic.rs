//! TomTom traffic flow client.
//!
//! Fetches current and free-flow speed for the road segment containing a
//! coordinate pair, via the Flow Segment Data API (absolute style, zoom 10).
//! See: https://developer.tomtom.com/traffic-api/documentation/traffic-flow/flow-segment-data

use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;

const TOMTOM_API_URL: &str = "https://api.tomtom.com";

/// Zoom level for flow segment lookups. 10 covers arterial roads without
/// snapping to every side street.
const FLOW_ZOOM: u8 = 10;

/// Timeout for each outbound traffic request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A traffic flow reading for the road segment nearest to the queried point.
/// Speeds are `None` when TomTom has no segment data for the location.
#[derive(Debug, Clone, Copy)]
pub struct TrafficReading {
    pub current_speed: Option<f64>,
    pub free_flow_speed: Option<f64>,
}

// --- TomTom JSON response types ---

#[derive(Debug, Deserialize)]
struct FlowResponse {
    #[serde(rename = "flowSegmentData")]
    flow_segment_data: Option<FlowSegmentData>,
}

#[derive(Debug, Deserialize)]
struct FlowSegmentData {
    #[serde(rename = "currentSpeed")]
    current_speed: Option<f64>,
    #[serde(rename = "freeFlowSpeed")]
    free_flow_speed: Option<f64>,
}

/// Client for the TomTom Flow Segment Data API.
#[derive(Debug, Clone)]
pub struct TrafficClient {
    client: reqwest::Client,
    base_url: String,
}

impl TrafficClient {
    pub fn new() -> Self {
        Self::with_base_url(TOMTOM_API_URL)
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

    /// Fetch the flow reading for the segment containing the given point.
    ///
    /// A response without segment data is a successful reading with `None`
    /// speeds; only transport and payload failures are errors.
    pub async fn fetch(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
    ) -> Result<TrafficReading, AppError> {
        let url = format!(
            "{}/traffic/services/4/flowSegmentData/absolute/{}/json",
            self.base_url, FLOW_ZOOM
        );
        let point = format!("{},{}", lat, lon);

        let response = self
            .client
            .get(&url)
            .query(&[("key", api_key), ("point", &point)])
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("TomTom request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::Upstream(format!(
                "TomTom returned HTTP {}",
                response.status()
            )));
        }

        let body: FlowResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("TomTom JSON parse error: {}", e)))?;

        let reading = match body.flow_segment_data {
            Some(segment) => TrafficReading {
                current_speed: segment.current_speed,
                free_flow_speed: segment.free_flow_speed,
            },
            None => {
                tracing::warn!("TomTom returned no flow segment for ({}, {})", lat, lon);
                TrafficReading {
                    current_speed: None,
                    free_flow_speed: None,
                }
            }
        };

        Ok(reading)
    }
}
