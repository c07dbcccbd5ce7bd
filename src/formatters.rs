use serde_json::Value;

use crate::models::{AlertFeature, AlertShapeError, ForecastPeriod};
use crate::sink::DiagnosticsSink;

/// Formats one alert feature into a readable block.
///
/// Total: structural problems come back as literal error markers so a single
/// bad feature never sinks the surrounding alerts response.
pub async fn format_alert(feature: &Value, sink: &dyn DiagnosticsSink) -> String {
    match AlertFeature::from_value(feature) {
        Ok(alert) => {
            sink.debug(&format!("Formatting alert for event: {}", alert.event))
                .await;
            tracing::debug!("Formatting alert for event: {}", alert.event);
            render_alert(&alert)
        }
        Err(AlertShapeError::MissingProperties) => {
            let msg = "Missing required field in alert data: properties";
            sink.warning(msg).await;
            tracing::warn!("{msg}");
            "Error: Invalid alert data format".to_string()
        }
        Err(AlertShapeError::MalformedField(field)) => {
            let msg = format!("Unexpected error while formatting alert: malformed field {field}");
            sink.error(&msg).await;
            tracing::error!("{msg}");
            "Error: Could not format alert".to_string()
        }
    }
}

fn render_alert(alert: &AlertFeature) -> String {
    format!(
        "\nEvent: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}\n",
        alert.event, alert.area_desc, alert.severity, alert.description, alert.instruction
    )
}

/// Formats one forecast period into a readable block.
pub fn format_period(period: &ForecastPeriod) -> String {
    format!(
        "\n{}:\nTemperature: {}\u{00b0}{}\nWind: {} {}\nForecast: {}\n",
        period.name,
        period.temperature,
        period.temperature_unit,
        period.wind_speed,
        period.wind_direction,
        period.detailed_forecast
    )
}
