use super::app::ClassificationOutcome;
use std::time::{Duration, SystemTime};

pub(super) fn format_raw_payload(outcome: &ClassificationOutcome) -> String {
    serde_json::to_string_pretty(&outcome.envelope)
        .unwrap_or_else(|_| "<unencodable result payload>".to_string())
}

pub(super) fn format_round_trip(duration: Duration) -> String {
    format!("{:.1}s", duration.as_secs_f64())
}

pub(super) fn format_received_at(time: SystemTime) -> String {
    humantime::format_rfc3339_seconds(time).to_string()
}
