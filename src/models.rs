use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::constants::{LOG_FILE, NWS_API_BASE, SERVER_NAME, USER_AGENT};

// ============================================================================
// Validated Inputs
// ============================================================================

/// Two-letter US state code, trimmed and uppercased before any network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCode(String);

impl StateCode {
    /// Returns `None` unless the trimmed input is exactly 2 characters.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.chars().count() != 2 {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum CoordinateError {
    #[error("Invalid latitude: {0}. Must be between -90 and 90.")]
    Latitude(f64),
    #[error("Invalid longitude: {0}. Must be between -180 and 180.")]
    Longitude(f64),
}

/// Latitude/longitude pair, bounds-checked before any network call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::Longitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

// ============================================================================
// National Weather Service Payload Extraction
// ============================================================================

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlertShapeError {
    #[error("missing or malformed properties object")]
    MissingProperties,
    #[error("malformed field: {0}")]
    MalformedField(&'static str),
}

/// One active alert, with per-field fallbacks already applied.
///
/// Alerts tolerate individually absent fields; only a missing `properties`
/// object (or a field of the wrong type) is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertFeature {
    pub event: String,
    pub area_desc: String,
    pub severity: String,
    pub description: String,
    pub instruction: String,
}

impl AlertFeature {
    pub fn from_value(feature: &Value) -> Result<Self, AlertShapeError> {
        let props = feature
            .get("properties")
            .and_then(Value::as_object)
            .ok_or(AlertShapeError::MissingProperties)?;

        Ok(Self {
            event: optional_text(props, "event", "Unknown")?,
            area_desc: optional_text(props, "areaDesc", "Unknown")?,
            severity: optional_text(props, "severity", "Unknown")?,
            description: optional_text(props, "description", "No description available")?,
            instruction: optional_text(
                props,
                "instruction",
                "No specific instructions provided",
            )?,
        })
    }
}

fn optional_text(
    props: &Map<String, Value>,
    key: &'static str,
    fallback: &str,
) -> Result<String, AlertShapeError> {
    match props.get(key) {
        None | Some(Value::Null) => Ok(fallback.to_string()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(_) => Err(AlertShapeError::MalformedField(key)),
    }
}

/// Outcome of resolving a coordinate against the points API: the URL of the
/// grid forecast endpoint. Absence of the path is a caller-visible failure,
/// not a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastPoint {
    pub forecast_url: String,
}

impl ForecastPoint {
    pub fn from_value(points: &Value) -> Option<Self> {
        let forecast_url = points
            .pointer("/properties/forecast")
            .and_then(Value::as_str)?;
        Some(Self {
            forecast_url: forecast_url.to_string(),
        })
    }
}

/// One forecast period. Unlike alerts, every field is required: a single
/// missing field fails the whole forecast operation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: i32,
    #[serde(rename = "temperatureUnit")]
    pub temperature_unit: String,
    #[serde(rename = "windSpeed")]
    pub wind_speed: String,
    #[serde(rename = "windDirection")]
    pub wind_direction: String,
    #[serde(rename = "detailedForecast")]
    pub detailed_forecast: String,
}

impl ForecastPeriod {
    pub fn from_value(period: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(period.clone())
    }
}

// ============================================================================
// Server Metadata
// ============================================================================

/// Static descriptor returned by the `server_info` tool.
#[derive(Debug, Clone, Serialize)]
pub struct ServerConfig {
    pub server_name: &'static str,
    pub log_file: &'static str,
    pub nws_api_base: &'static str,
    pub user_agent: &'static str,
    pub available_tools: [&'static str; 3],
}

impl ServerConfig {
    pub fn current() -> Self {
        Self {
            server_name: SERVER_NAME,
            log_file: LOG_FILE,
            nws_api_base: NWS_API_BASE,
            user_agent: USER_AGENT,
            available_tools: ["get_alerts", "get_forecast", "server_info"],
        }
    }
}

// ============================================================================
// MCP Tool Request Models
// ============================================================================

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetAlertsRequest {
    /// Two-letter US state code (e.g. CA, NY)
    pub state: String,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema)]
pub struct GetForecastRequest {
    /// Latitude of the location
    pub latitude: f64,
    /// Longitude of the location
    pub longitude: f64,
}
