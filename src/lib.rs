//! Core library for the weather MCP server.
//!
//! This crate defines:
//! - The NWS HTTP client with classified failure modes
//! - Typed extraction of alert and forecast payloads
//! - The alerts and forecast orchestration pipelines
//! - Progress/diagnostics sinks bridging to the MCP session
//!
//! It is used by the `weather-mcp` binary, but the operations can also be
//! driven directly against any [`client::WeatherSource`].

pub mod client;
pub mod constants;
pub mod formatters;
pub mod models;
pub mod service;
pub mod sink;

pub use client::{FetchError, NwsClient, WeatherSource};
pub use models::{AlertFeature, Coordinate, ForecastPeriod, ForecastPoint, StateCode};
pub use service::Weather;
pub use sink::{DiagnosticsSink, McpSink, NoopSink, ProgressSink, SessionSink};
