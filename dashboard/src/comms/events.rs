//! Display-facing data model.
//!
//! These are the types cached by the pollers and serialized to display
//! surfaces over the bridge (camelCase JSON, matching what the dashboard
//! front-end consumes). Each has a `From` conversion from its wire
//! counterpart in `shared::sentinelguard`, so the rest of the host never
//! touches prost types directly.
//!
//! All timestamps are epoch milliseconds; the unit is a contract with the
//! agent, never guessed per value.

use serde::{Deserialize, Serialize};
use shared::sentinelguard as proto;

/// One detection event from the live alert stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub timestamp: i64,
    pub process_id: u32,
    pub process_path: String,
    pub ml_score: f64,
    pub quarantined: bool,
    pub detectors: Vec<String>,
}

impl From<proto::Alert> for Alert {
    fn from(a: proto::Alert) -> Self {
        Self {
            id: a.id,
            timestamp: a.timestamp,
            process_id: a.process_id,
            process_path: a.process_path,
            ml_score: a.ml_score,
            quarantined: a.quarantined,
            detectors: a.detectors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRiskEntry {
    pub process_id: u32,
    pub process_path: String,
    pub risk_score: f64,
    pub last_activity: i64,
    pub detectors: Vec<String>,
}

impl From<proto::ProcessRisk> for ProcessRiskEntry {
    fn from(p: proto::ProcessRisk) -> Self {
        Self {
            process_id: p.process_id,
            process_path: p.process_path,
            risk_score: p.risk_score,
            last_activity: p.last_activity,
            detectors: p.detectors,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarantinedProcessEntry {
    pub process_id: u32,
    pub process_path: String,
    pub risk_score: f64,
    pub quarantined_at: i64,
    pub reason: String,
}

impl From<proto::QuarantinedProcess> for QuarantinedProcessEntry {
    fn from(p: proto::QuarantinedProcess) -> Self {
        Self {
            process_id: p.process_id,
            process_path: p.process_path,
            risk_score: p.risk_score,
            quarantined_at: p.quarantined_at,
            reason: p.reason,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorLogEntry {
    pub detector: String,
    pub process_id: u32,
    pub score: f64,
    pub timestamp: i64,
    pub details: String,
}

impl From<proto::DetectorLogEntry> for DetectorLogEntry {
    fn from(e: proto::DetectorLogEntry) -> Self {
        Self {
            detector: e.detector,
            process_id: e.process_id,
            score: e.score,
            timestamp: e.timestamp,
            details: e.details,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealthSnapshot {
    pub agent_running: bool,
    pub driver_loaded: bool,
    pub events_per_second: u64,
    pub total_events: u64,
    pub active_processes: u32,
    pub quarantined_count: u32,
    pub cpu_usage: f64,
    pub memory_usage: f64,
}

impl From<proto::SystemHealth> for SystemHealthSnapshot {
    fn from(h: proto::SystemHealth) -> Self {
        Self {
            agent_running: h.agent_running,
            driver_loaded: h.driver_loaded,
            events_per_second: h.events_per_second,
            total_events: h.total_events,
            active_processes: h.active_processes,
            quarantined_count: h.quarantined_count,
            cpu_usage: h.cpu_usage,
            memory_usage: h.memory_usage,
        }
    }
}

/// Outcome of the release-from-quarantine command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOutcome {
    pub success: bool,
    pub message: String,
}

impl From<proto::ReleaseFromQuarantineResponse> for ReleaseOutcome {
    fn from(r: proto::ReleaseFromQuarantineResponse) -> Self {
        Self {
            success: r.success,
            message: r.message,
        }
    }
}

/// Abnormal end of the alert stream, as delivered to display surfaces.
/// Serializes to `{ "__streamError": true, "message": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamFailure {
    #[serde(rename = "__streamError")]
    pub stream_error: bool,
    pub message: String,
}

impl StreamFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            stream_error: true,
            message: message.into(),
        }
    }
}

/// What the fan-out delivers to listeners: either an alert or the terminal
/// error that ended the session. A self-initiated cancellation is never
/// published as either.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    Alert(Alert),
    TerminalError(StreamFailure),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alert_serializes_camel_case() {
        let alert = Alert {
            id: "a1".into(),
            timestamp: 1_700_000_000_000,
            process_id: 99,
            process_path: r"C:\Users\Test\malware.exe".into(),
            ml_score: 0.92,
            quarantined: true,
            detectors: vec!["entropy".into()],
        };
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["processId"], 99);
        assert_eq!(json["mlScore"], 0.92);
        assert!(json.get("process_id").is_none());
    }

    #[test]
    fn stream_failure_carries_marker() {
        let ev = StreamEvent::TerminalError(StreamFailure::new("stream broke"));
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["__streamError"], true);
        assert_eq!(json["message"], "stream broke");
    }
}
