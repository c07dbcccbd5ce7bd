use async_trait::async_trait;
use rmcp::{
    model::{
        LoggingLevel, LoggingMessageNotificationParam, ProgressNotificationParam, ProgressToken,
    },
    service::{Peer, RequestContext, RoleServer},
};
use serde_json::json;
use std::fmt;

use crate::constants::SERVER_NAME;

/// Severity of a session-scoped diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticLevel::Debug => write!(f, "DEBUG"),
            DiagnosticLevel::Info => write!(f, "INFO"),
            DiagnosticLevel::Warning => write!(f, "WARN"),
            DiagnosticLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<DiagnosticLevel> for LoggingLevel {
    fn from(level: DiagnosticLevel) -> Self {
        match level {
            DiagnosticLevel::Debug => LoggingLevel::Debug,
            DiagnosticLevel::Info => LoggingLevel::Info,
            DiagnosticLevel::Warning => LoggingLevel::Warning,
            DiagnosticLevel::Error => LoggingLevel::Error,
        }
    }
}

/// Leveled log messages delivered to the calling session.
///
/// Emission is best-effort: implementations must swallow delivery failures so
/// a broken sink can never fail the operation that reports through it.
#[async_trait]
pub trait DiagnosticsSink: Send + Sync {
    async fn emit(&self, level: DiagnosticLevel, message: &str);

    async fn debug(&self, message: &str) {
        self.emit(DiagnosticLevel::Debug, message).await;
    }

    async fn info(&self, message: &str) {
        self.emit(DiagnosticLevel::Info, message).await;
    }

    async fn warning(&self, message: &str) {
        self.emit(DiagnosticLevel::Warning, message).await;
    }

    async fn error(&self, message: &str) {
        self.emit(DiagnosticLevel::Error, message).await;
    }
}

/// Fractional progress reports delivered to the calling session.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Report `progress` out of `total` (operations here always use a total
    /// of 1.0). Best-effort, like diagnostics.
    async fn report_progress(&self, progress: f64, total: f64, message: &str);
}

/// Everything an operation needs from its session.
pub trait SessionSink: ProgressSink + DiagnosticsSink {}

impl<T: ProgressSink + DiagnosticsSink + ?Sized> SessionSink for T {}

/// Inert sink for callers without a session, e.g. library use of the client.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

#[async_trait]
impl DiagnosticsSink for NoopSink {
    async fn emit(&self, _level: DiagnosticLevel, _message: &str) {}
}

#[async_trait]
impl ProgressSink for NoopSink {
    async fn report_progress(&self, _progress: f64, _total: f64, _message: &str) {}
}

/// Sink backed by the MCP peer of one tool call.
///
/// Diagnostics become `notifications/message`; progress becomes
/// `notifications/progress`, keyed by the token the client attached to the
/// request. Without a token, progress reports are dropped.
#[derive(Clone)]
pub struct McpSink {
    peer: Peer<RoleServer>,
    progress_token: Option<ProgressToken>,
}

impl McpSink {
    pub fn new(peer: Peer<RoleServer>, progress_token: Option<ProgressToken>) -> Self {
        Self {
            peer,
            progress_token,
        }
    }

    pub fn from_context(context: &RequestContext<RoleServer>) -> Self {
        Self::new(context.peer.clone(), context.meta.get_progress_token())
    }
}

#[async_trait]
impl DiagnosticsSink for McpSink {
    async fn emit(&self, level: DiagnosticLevel, message: &str) {
        let params = LoggingMessageNotificationParam {
            level: level.into(),
            logger: Some(SERVER_NAME.to_string()),
            data: json!(message),
        };
        if let Err(e) = self.peer.notify_logging_message(params).await {
            tracing::debug!("Failed to deliver log notification: {e}");
        }
    }
}

#[async_trait]
impl ProgressSink for McpSink {
    async fn report_progress(&self, progress: f64, total: f64, message: &str) {
        let Some(token) = &self.progress_token else {
            return;
        };
        let params = ProgressNotificationParam {
            progress_token: token.clone(),
            progress,
            total: Some(total),
            message: Some(message.to_string()),
        };
        if let Err(e) = self.peer.notify_progress(params).await {
            tracing::debug!("Failed to deliver progress notification: {e}");
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_levels_map_to_mcp_levels() {
        assert!(matches!(
            LoggingLevel::from(DiagnosticLevel::Debug),
            LoggingLevel::Debug
        ));
        assert!(matches!(
            LoggingLevel::from(DiagnosticLevel::Info),
            LoggingLevel::Info
        ));
        assert!(matches!(
            LoggingLevel::from(DiagnosticLevel::Warning),
            LoggingLevel::Warning
        ));
        assert!(matches!(
            LoggingLevel::from(DiagnosticLevel::Error),
            LoggingLevel::Error
        ));
    }

    #[tokio::test]
    async fn noop_sink_accepts_everything() {
        let sink = NoopSink;
        sink.debug("ignored").await;
        sink.error("ignored").await;
        sink.report_progress(0.5, 1.0, "ignored").await;
    }
}
