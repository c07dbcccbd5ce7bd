use std::time::Duration;

/// User agent string for HTTP requests
pub const USER_AGENT: &str = "weather-app/1.0";

/// National Weather Service API base URL
pub const NWS_API_BASE: &str = "https://api.weather.gov";

/// Timeout applied to every upstream request
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Append-mode log file written alongside stderr output
pub const LOG_FILE: &str = "weather_mcp.log";

/// Server name advertised to MCP clients
pub const SERVER_NAME: &str = "weather";
