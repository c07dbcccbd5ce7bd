use anyhow::Result;
use rmcp::{
    handler::server::{wrapper::Parameters, ServerHandler, tool::ToolRouter},
    model::{CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    service::{RequestContext, RoleServer},
    tool, tool_handler, tool_router,
    ErrorData as McpError,
};
use serde_json::Value;
use std::sync::Arc;

use crate::client::{NwsClient, WeatherSource};
use crate::constants::{NWS_API_BASE, SERVER_NAME};
use crate::formatters::{format_alert, format_period};
use crate::models::{
    Coordinate, CoordinateError, ForecastPeriod, ForecastPoint, GetAlertsRequest,
    GetForecastRequest, ServerConfig, StateCode,
};
use crate::sink::{DiagnosticsSink, McpSink, SessionSink};

/// Separator between formatted alert or forecast blocks.
const BLOCK_SEPARATOR: &str = "\n---\n";

/// Maximum number of forecast periods included in one response.
const MAX_PERIODS: usize = 5;

/// Main weather service that handles MCP requests
#[derive(Clone)]
pub struct Weather {
    source: Arc<dyn WeatherSource>,
    tool_router: ToolRouter<Self>,
}

impl Weather {
    /// Creates a service backed by the live NWS client.
    pub fn new() -> Result<Self> {
        Ok(Self::with_source(Arc::new(NwsClient::new()?)))
    }

    /// Creates a service backed by an arbitrary payload source.
    pub fn with_source(source: Arc<dyn WeatherSource>) -> Self {
        Self {
            source,
            tool_router: Self::tool_router(),
        }
    }

    /// Fetches, formats and joins the active alerts for a US state.
    ///
    /// Total: every outcome, including upstream failure, is a plain string.
    pub async fn active_alerts(&self, state: &str, sink: &dyn SessionSink) -> String {
        sink.info(&format!("Fetching weather alerts for state: {state}"))
            .await;
        tracing::info!("Processing alerts request for state: {state}");

        let Some(state) = StateCode::parse(state) else {
            let msg = format!("Invalid state code format: {state}. Expected 2-letter code.");
            sink.warning(&msg).await;
            tracing::warn!("{msg}");
            return "Error: State code must be exactly 2 letters (e.g., CA, NY)".to_string();
        };

        let url = format!("{NWS_API_BASE}/alerts/active/area/{}", state.as_str());
        sink.debug(&format!("Requesting alerts from URL: {url}")).await;

        let data = match self.source.fetch(&url, sink).await {
            Ok(data) => data,
            Err(err) => {
                // The specific failure kind stays on the diagnostic channel;
                // the caller gets one generic message.
                let msg = format!("Unable to fetch alerts for state: {}", state.as_str());
                sink.error(&msg).await;
                tracing::error!("Alerts request failed for {}: {err}", state.as_str());
                return "Unable to fetch alerts or no alerts found.".to_string();
            }
        };

        let Some(features) = data.get("features").and_then(Value::as_array) else {
            let msg = format!("Invalid response format for state: {}", state.as_str());
            sink.error(&msg).await;
            tracing::error!("{msg}");
            return "Invalid response format from weather service.".to_string();
        };

        if features.is_empty() {
            sink.info(&format!(
                "No active alerts found for state: {}",
                state.as_str()
            ))
            .await;
            tracing::info!("No active alerts for state: {}", state.as_str());
            return "No active alerts for this state.".to_string();
        }

        let total = features.len();
        sink.info(&format!(
            "Processing {total} alerts for state: {}",
            state.as_str()
        ))
        .await;
        tracing::info!("Found {total} alerts for state: {}", state.as_str());

        let mut alerts = Vec::with_capacity(total);
        for (i, feature) in features.iter().enumerate() {
            alerts.push(format_alert(feature, sink).await);
            sink.report_progress(
                (i + 1) as f64 / total as f64,
                1.0,
                &format!("Processing alert {}/{total}", i + 1),
            )
            .await;
        }

        sink.info(&format!(
            "Successfully processed {total} alerts for state: {}",
            state.as_str()
        ))
        .await;

        alerts.join(BLOCK_SEPARATOR)
    }

    /// Resolves a coordinate to its grid forecast and formats the next
    /// periods. Two sequential upstream calls; the second depends on the
    /// first.
    pub async fn point_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        sink: &dyn SessionSink,
    ) -> String {
        sink.info(&format!(
            "Fetching weather forecast for coordinates: {latitude}, {longitude}"
        ))
        .await;
        tracing::info!("Processing forecast request for coordinates: {latitude}, {longitude}");

        let coordinate = match Coordinate::new(latitude, longitude) {
            Ok(coordinate) => coordinate,
            Err(err) => {
                sink.warning(&err.to_string()).await;
                tracing::warn!("{err}");
                return match err {
                    CoordinateError::Latitude(_) => {
                        "Error: Latitude must be between -90 and 90 degrees.".to_string()
                    }
                    CoordinateError::Longitude(_) => {
                        "Error: Longitude must be between -180 and 180 degrees.".to_string()
                    }
                };
            }
        };

        // Step 1: resolve the forecast grid endpoint for this coordinate.
        sink.debug("Step 1: Getting forecast grid endpoint from NWS points API")
            .await;
        let points_url = format!(
            "{NWS_API_BASE}/points/{},{}",
            coordinate.latitude, coordinate.longitude
        );

        sink.report_progress(0.3, 1.0, "Getting grid information...").await;

        let points = match self.source.fetch(&points_url, sink).await {
            Ok(points) => points,
            Err(err) => {
                sink.error(&format!(
                    "Unable to fetch forecast grid data for coordinates: {latitude}, {longitude}"
                ))
                .await;
                tracing::error!("Points request failed: {err}");
                return "Unable to fetch forecast data for this location.".to_string();
            }
        };

        let Some(point) = ForecastPoint::from_value(&points) else {
            let msg = format!(
                "Invalid points response format for coordinates: {latitude}, {longitude}"
            );
            sink.error(&msg).await;
            tracing::error!("{msg}");
            return "Invalid response format from weather service points API.".to_string();
        };
        sink.debug(&format!("Retrieved forecast URL: {}", point.forecast_url))
            .await;
        tracing::debug!("Forecast URL: {}", point.forecast_url);

        // Step 2: fetch the detailed forecast from the resolved endpoint.
        sink.debug("Step 2: Getting detailed forecast data").await;
        sink.report_progress(0.6, 1.0, "Fetching detailed forecast...").await;

        let forecast = match self.source.fetch(&point.forecast_url, sink).await {
            Ok(forecast) => forecast,
            Err(err) => {
                sink.error(&format!(
                    "Unable to fetch detailed forecast for coordinates: {latitude}, {longitude}"
                ))
                .await;
                tracing::error!("Forecast request failed: {err}");
                return "Unable to fetch detailed forecast.".to_string();
            }
        };

        let periods = forecast
            .pointer("/properties/periods")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if periods.is_empty() {
            sink.warning(&format!(
                "No forecast periods available for coordinates: {latitude}, {longitude}"
            ))
            .await;
            tracing::warn!("No forecast periods for coordinates: {latitude}, {longitude}");
            return "No forecast periods available for this location.".to_string();
        }

        let period_count = periods.len().min(MAX_PERIODS);
        sink.info(&format!("Processing {period_count} forecast periods"))
            .await;
        tracing::info!("Processing {period_count} forecast periods");

        sink.report_progress(
            0.8,
            1.0,
            &format!("Formatting {period_count} forecast periods..."),
        )
        .await;

        let mut forecasts = Vec::with_capacity(period_count);
        for (i, raw) in periods.iter().take(MAX_PERIODS).enumerate() {
            let period = match ForecastPeriod::from_value(raw) {
                Ok(period) => period,
                Err(err) => {
                    // One malformed period fails the whole forecast, unlike
                    // alerts where a bad feature degrades to a marker block.
                    let msg = format!("Missing required field in forecast data: {err}");
                    sink.error(&msg).await;
                    tracing::error!("{msg}");
                    return "Error: Invalid forecast data format.".to_string();
                }
            };
            forecasts.push(format_period(&period));

            sink.report_progress(
                0.8 + 0.2 * (i + 1) as f64 / period_count as f64,
                1.0,
                &format!("Processed period {}/{period_count}", i + 1),
            )
            .await;
        }

        sink.info(&format!(
            "Successfully processed forecast for coordinates: {latitude}, {longitude}"
        ))
        .await;
        tracing::info!("Successfully processed forecast for coordinates: {latitude}, {longitude}");

        forecasts.join(BLOCK_SEPARATOR)
    }
}

#[tool_handler]
impl ServerHandler for Weather {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some(
                "A weather information service powered by the National Weather Service API. \
                Provides active weather alerts by US state and short-range forecasts by \
                coordinate."
                    .to_string(),
            ),
        }
    }
}

#[tool_router]
impl Weather {
    /// Gets active weather alerts for a US state
    #[tool(description = "Get weather alerts for a US state. Provide a two-letter state code (e.g., 'CA' for California, 'NY' for New York).")]
    async fn get_alerts(
        &self,
        Parameters(request): Parameters<GetAlertsRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let sink = McpSink::from_context(&context);
        let report = self.active_alerts(&request.state, &sink).await;
        Ok(CallToolResult::success(vec![Content::text(report)]))
    }

    /// Gets the short-range weather forecast for a coordinate
    #[tool(description = "Get weather forecast for a US location. Provide latitude and longitude (e.g., latitude: 38.9, longitude: -77.0 for Washington, DC).")]
    async fn get_forecast(
        &self,
        Parameters(request): Parameters<GetForecastRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let sink = McpSink::from_context(&context);
        let report = self
            .point_forecast(request.latitude, request.longitude, &sink)
            .await;
        Ok(CallToolResult::success(vec![Content::text(report)]))
    }

    /// Describes the running server configuration
    #[tool(description = "Get information about the current weather server configuration.")]
    async fn server_info(
        &self,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let sink = McpSink::from_context(&context);
        sink.info("Retrieving server information").await;
        tracing::info!("Server info requested");

        let config = ServerConfig::current();
        let text = serde_json::to_string_pretty(&config).map_err(|e| {
            McpError::internal_error(format!("Failed to serialize server info: {e}"), None)
        })?;

        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}
