//! Transport gateway contract towards the detection agent.
//!
//! The sync layer (session manager, pollers, action gateway) only ever talks
//! to [`AgentTransport`]; the production implementation lives in
//! [`crate::comms::grpc`] and the tests script their own double.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::comms::events::{
    Alert, DetectorLogEntry, ProcessRiskEntry, QuarantinedProcessEntry, ReleaseOutcome,
    SystemHealthSnapshot,
};

/// Failure taxonomy for everything that crosses the agent boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    /// The endpoint could not be reached when the gateway was built; every
    /// call through a degraded gateway fails with this until restart.
    #[error("agent endpoint unavailable: {0}")]
    Unavailable(String),

    /// The distinguishable caller-cancelled condition. The session manager
    /// suppresses it; it must never surface as a terminal stream error.
    #[error("call cancelled")]
    Cancelled,

    /// Any other transport or status failure.
    #[error("{0}")]
    Rpc(String),
}

impl TransportError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

impl From<tonic::Status> for TransportError {
    fn from(status: tonic::Status) -> Self {
        match status.code() {
            tonic::Code::Cancelled => TransportError::Cancelled,
            code => TransportError::Rpc(format!("{code:?}: {}", status.message())),
        }
    }
}

/// The live alert feed: already mapped to display types, errors included.
pub type AlertStream = Pin<Box<dyn Stream<Item = Result<Alert, TransportError>> + Send>>;

/// One gateway instance == one logical connection to the agent. Unary calls
/// are snapshots or commands; `alert_stream` opens the single long-lived
/// push stream. The implementation bounds every call with its own timeouts
/// so a stream-open can never hang in connecting forever.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn system_health(&self) -> Result<SystemHealthSnapshot, TransportError>;

    async fn process_risk_overview(
        &self,
        limit: u32,
    ) -> Result<Vec<ProcessRiskEntry>, TransportError>;

    async fn quarantined_processes(
        &self,
    ) -> Result<Vec<QuarantinedProcessEntry>, TransportError>;

    async fn detector_logs(
        &self,
        since_timestamp: i64,
        limit: u32,
    ) -> Result<Vec<DetectorLogEntry>, TransportError>;

    async fn release_from_quarantine(
        &self,
        process_id: u32,
    ) -> Result<ReleaseOutcome, TransportError>;

    /// Open the alert stream seeded at `since_timestamp` (epoch ms).
    async fn alert_stream(&self, since_timestamp: i64) -> Result<AlertStream, TransportError>;
}
