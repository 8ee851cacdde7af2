//! Travel health score aggregation.
//!
//! Pure arithmetic over the raw provider readings — no I/O. Takes the AQI and
//! the current/free-flow speed pair, derives two 0–100 "healthiness"
//! sub-scores, blends them into an overall score and classifies the result.
//!
//! Every input is optional because each provider can independently fail to
//! report (unknown station, no road segment at the point). Absence propagates
//! through the pipeline as `None` rather than a default value, so a missing
//! metric never drags the score down.

/// Weight of the pollution sub-score in the overall blend.
const POLLUTION_WEIGHT: f64 = 0.6;
/// Weight of the traffic sub-score in the overall blend.
const TRAFFIC_WEIGHT: f64 = 0.4;
/// AQI ceiling: readings at or above this map to a pollution health of 0.
const AQI_SCALE_MAX: f64 = 500.0;

/// Qualitative classification of an overall health score.
///
/// Brackets are inclusive lower bounds; the highest matching bracket wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthLevel {
    /// overall >= 70
    Good,
    /// 50 <= overall < 70
    Moderate,
    /// 30 <= overall < 50
    UnhealthyForSensitiveGroups,
    /// overall < 30
    VeryUnhealthy,
    /// Neither metric was available.
    NoData,
}

impl HealthLevel {
    /// Classify an overall health score into a qualitative level.
    pub fn classify(overall_health: Option<f64>) -> Self {
        match overall_health {
            Some(score) if score >= 70.0 => HealthLevel::Good,
            Some(score) if score >= 50.0 => HealthLevel::Moderate,
            Some(score) if score >= 30.0 => HealthLevel::UnhealthyForSensitiveGroups,
            Some(_) => HealthLevel::VeryUnhealthy,
            None => HealthLevel::NoData,
        }
    }

    /// Display label used in the API response.
    pub fn label(&self) -> &'static str {
        match self {
            HealthLevel::Good => "Good",
            HealthLevel::Moderate => "Moderate",
            HealthLevel::UnhealthyForSensitiveGroups => "Unhealthy for sensitive groups",
            HealthLevel::VeryUnhealthy => "Very unhealthy",
            HealthLevel::NoData => "No data",
        }
    }

    /// Fixed advisory text for this level.
    pub fn advice(&self) -> &'static str {
        match self {
            HealthLevel::Good => "Safe for all.",
            HealthLevel::Moderate => "OK, but sensitive groups should be careful.",
            HealthLevel::UnhealthyForSensitiveGroups => {
                "Sensitive people should limit outdoor activity."
            }
            HealthLevel::VeryUnhealthy => "Not suitable for vulnerable individuals.",
            HealthLevel::NoData => "Insufficient data.",
        }
    }

    /// Whether travel is considered suitable at this level.
    pub fn suitable(&self) -> bool {
        match self {
            HealthLevel::Good
            | HealthLevel::Moderate
            | HealthLevel::UnhealthyForSensitiveGroups => true,
            HealthLevel::VeryUnhealthy | HealthLevel::NoData => false,
        }
    }
}

/// The complete computed assessment for one location.
///
/// Built fresh per request and never persisted.
#[derive(Debug)]
pub struct HealthAssessment {
    pub aqi: Option<i64>,
    pub congestion_percent: Option<f64>,
    pub pollution_health: Option<f64>,
    pub traffic_health: Option<f64>,
    pub overall_health: Option<f64>,
    pub level: HealthLevel,
}

impl HealthAssessment {
    /// Run the full aggregation pipeline over the raw provider readings.
    pub fn assess(
        aqi: Option<i64>,
        current_speed: Option<f64>,
        free_flow_speed: Option<f64>,
    ) -> Self {
        let congestion = congestion_percent(current_speed, free_flow_speed);
        let pollution = pollution_health(aqi);
        let traffic = traffic_health(congestion);
        let overall = overall_health(pollution, traffic);

        Self {
            aqi,
            congestion_percent: congestion,
            pollution_health: pollution,
            traffic_health: traffic,
            overall_health: overall,
            level: HealthLevel::classify(overall),
        }
    }
}

/// Percentage by which current speed falls below free-flow speed.
///
/// 0 when traffic flows at or above free-flow, 100 when stationary.
/// `None` when either speed is missing or the free-flow speed is non-positive
/// (a zero free-flow segment carries no congestion information).
pub fn congestion_percent(current_speed: Option<f64>, free_flow_speed: Option<f64>) -> Option<f64> {
    match (current_speed, free_flow_speed) {
        (Some(current), Some(free_flow)) if free_flow > 0.0 => {
            let ratio = current / free_flow;
            if ratio >= 1.0 {
                Some(0.0)
            } else {
                Some(((1.0 - ratio) * 100.0).clamp(0.0, 100.0))
            }
        }
        _ => None,
    }
}

/// Pollution sub-score: AQI clamped to [0, 500] and inverted onto a 0–100
/// healthiness scale (0 AQI → 100, 500+ AQI → 0).
pub fn pollution_health(aqi: Option<i64>) -> Option<f64> {
    aqi.map(|value| {
        let clamped = (value as f64).min(AQI_SCALE_MAX);
        (100.0 - (clamped / AQI_SCALE_MAX) * 100.0).max(0.0)
    })
}

/// Traffic sub-score: inverse of the congestion percentage.
pub fn traffic_health(congestion_percent: Option<f64>) -> Option<f64> {
    congestion_percent.map(|congestion| (100.0 - congestion).max(0.0))
}

/// Weighted overall score. With both sub-scores present, pollution weighs
/// 60% and traffic 40%; with one present, that one stands alone.
pub fn overall_health(pollution_health: Option<f64>, traffic_health: Option<f64>) -> Option<f64> {
    match (pollution_health, traffic_health) {
        (Some(pollution), Some(traffic)) => {
            Some(POLLUTION_WEIGHT * pollution + TRAFFIC_WEIGHT * traffic)
        }
        (Some(pollution), None) => Some(pollution),
        (None, Some(traffic)) => Some(traffic),
        (None, None) => None,
    }
}
