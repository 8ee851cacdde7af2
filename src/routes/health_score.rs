//! Travel health score endpoint.
//!
//! - GET /api/v1/health-score?location=NAME&question=TEXT
//!
//! Orchestrates geocode → {AQI ∥ traffic} → score aggregation → optional
//! AI advice, and shapes the combined JSON response.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::config::AppConfig;
use crate::errors::{AppError, ErrorResponse};
use crate::scoring::HealthAssessment;
use crate::services::advice::{build_prompt, AdviceClient};
use crate::services::aqi::AqiClient;
use crate::services::geocode::GeocodeClient;
use crate::services::traffic::TrafficClient;

/// Shared application state for the scoring endpoint.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) geocode: GeocodeClient,
    pub(crate) aqi: AqiClient,
    pub(crate) traffic: TrafficClient,
    pub(crate) advice: AdviceClient,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HealthScoreQuery {
    /// Place name to assess (e.g. "Zurich")
    pub location: Option<String>,
    /// Optional free-text question; triggers an AI advice call when non-empty
    pub question: Option<String>,
}

/// Combined health score response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthScoreResponse {
    /// Echo of the requested location name
    pub location: String,
    /// Latitude of the geocoded location (WGS84)
    pub lat: f64,
    /// Longitude of the geocoded location (WGS84)
    pub lon: f64,
    /// Raw AQI reading, null when the provider has no data
    pub aqi: Option<i64>,
    /// Congestion percentage (0 = free flow, 100 = standstill), null when unknown
    pub congestion_percent: Option<f64>,
    /// Pollution sub-score on a 0–100 healthiness scale
    pub pollution_health: Option<f64>,
    /// Traffic sub-score on a 0–100 healthiness scale
    pub traffic_health: Option<f64>,
    /// Weighted overall score (60% pollution, 40% traffic)
    pub overall_health: Option<f64>,
    /// Qualitative level (e.g. "Good", "Moderate", "No data")
    pub level: String,
    /// Fixed advisory text for the level
    pub advice: String,
    /// Whether travel is considered suitable
    pub suitable: bool,
    /// AI-generated advice, null unless a question was asked
    pub ai_advice: Option<String>,
}

/// Compute the travel health score for a location.
///
/// Geocodes the place name, fetches the AQI and traffic readings
/// concurrently, aggregates them into a weighted score with a qualitative
/// classification, and optionally asks the chat-completion endpoint for
/// tailored advice when a question is supplied.
///
/// Input validation and the credential check happen before any outbound
/// request. Any downstream failure yields a single generic 500 — partial
/// assessments are never returned.
#[utoipa::path(
    get,
    path = "/api/v1/health-score",
    tag = "Health score",
    params(HealthScoreQuery),
    responses(
        (status = 200, description = "Computed health score for the location", body = HealthScoreResponse),
        (status = 400, description = "Missing or empty location parameter", body = ErrorResponse),
        (status = 500, description = "Missing provider credentials, or a downstream lookup failed", body = ErrorResponse),
    )
)]
pub async fn get_health_score(
    State(state): State<AppState>,
    Query(params): Query<HealthScoreQuery>,
) -> Result<Json<HealthScoreResponse>, AppError> {
    let location = match params.location.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return Err(AppError::BadRequest(
                "location name is required.".to_string(),
            ))
        }
    };

    let creds = state.config.credentials()?;

    let coords = state.geocode.geocode(location).await?;
    tracing::info!(
        "Geocoded '{}' to ({}, {})",
        location,
        coords.lat,
        coords.lon
    );

    // The two metric lookups are independent; issue them concurrently and
    // await both before scoring.
    let (aqi_result, traffic_result) = futures::join!(
        state.aqi.fetch(creds.aqicn_token, coords.lat, coords.lon),
        state.traffic.fetch(creds.tomtom_api_key, coords.lat, coords.lon),
    );
    let air = aqi_result?;
    let flow = traffic_result?;

    let assessment = HealthAssessment::assess(air.aqi, flow.current_speed, flow.free_flow_speed);
    tracing::info!(
        "Assessed '{}': aqi={:?} congestion={:?} overall={:?} level={}",
        location,
        assessment.aqi,
        assessment.congestion_percent,
        assessment.overall_health,
        assessment.level.label()
    );

    let ai_advice = match params.question.as_deref().filter(|q| !q.is_empty()) {
        Some(question) => {
            let prompt = build_prompt(
                question,
                assessment.aqi,
                assessment.congestion_percent,
                assessment.overall_health,
            );
            state.advice.complete(creds.openai_api_key, &prompt).await?
        }
        None => None,
    };

    Ok(Json(HealthScoreResponse {
        location: location.to_string(),
        lat: coords.lat,
        lon: coords.lon,
        aqi: assessment.aqi,
        congestion_percent: assessment.congestion_percent,
        pollution_health: assessment.pollution_health,
        traffic_health: assessment.traffic_health,
        overall_health: assessment.overall_health,
        level: assessment.level.label().to_string(),
        advice: assessment.level.advice().to_string(),
        suitable: assessment.level.suitable(),
        ai_advice,
    }))
}
