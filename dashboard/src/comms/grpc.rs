//! gRPC-backed transport gateway, plus the degraded fallback.
//!
//! [`GrpcTransport`] wraps the `sentinelguard` client from the shared crate
//! and converts wire types to display types at the boundary. Construction
//! connects eagerly: an unreachable endpoint is reported once by the caller
//! and the host then runs on [`UnavailableTransport`], where every call
//! fails fast with the same condition. No reconnection happens at this
//! layer.

use async_trait::async_trait;
use futures::StreamExt;
use log::debug;
use std::time::Duration;
use tonic::transport::Endpoint;

use shared::sentinelguard as proto;
use shared::sentinelguard::sentinel_guard_service_client::SentinelGuardServiceClient;

use crate::comms::events::{
    Alert, DetectorLogEntry, ProcessRiskEntry, QuarantinedProcessEntry, ReleaseOutcome,
    SystemHealthSnapshot,
};
use crate::comms::transport::{AgentTransport, AlertStream, TransportError};

pub struct GrpcTransport {
    client: SentinelGuardServiceClient,
}

impl GrpcTransport {
    /// Connect to the agent endpoint. `endpoint` must carry a scheme
    /// (`http://host:port`). Connect and per-request timeouts bound every
    /// call issued through this gateway, the stream-open included.
    pub async fn connect(
        endpoint: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let endpoint = Endpoint::from_shared(endpoint.to_string())
            .map_err(|e| TransportError::Unavailable(e.to_string()))?
            .connect_timeout(connect_timeout)
            .timeout(request_timeout);
        let client = SentinelGuardServiceClient::connect(endpoint)
            .await
            .map_err(|e| TransportError::Unavailable(e.to_string()))?;
        debug!("grpc: connected to agent");
        Ok(Self { client })
    }
}

#[async_trait]
impl AgentTransport for GrpcTransport {
    async fn system_health(&self) -> Result<SystemHealthSnapshot, TransportError> {
        let mut client = self.client.clone();
        let resp = client
            .get_system_health(proto::GetSystemHealthRequest {})
            .await?;
        Ok(resp.into_inner().into())
    }

    async fn process_risk_overview(
        &self,
        limit: u32,
    ) -> Result<Vec<ProcessRiskEntry>, TransportError> {
        let mut client = self.client.clone();
        let resp = client
            .get_process_risk_overview(proto::GetProcessRiskOverviewRequest { limit })
            .await?;
        Ok(resp
            .into_inner()
            .processes
            .into_iter()
            .map(ProcessRiskEntry::from)
            .collect())
    }

    async fn quarantined_processes(
        &self,
    ) -> Result<Vec<QuarantinedProcessEntry>, TransportError> {
        let mut client = self.client.clone();
        let resp = client
            .get_quarantined_processes(proto::GetQuarantinedProcessesRequest {})
            .await?;
        Ok(resp
            .into_inner()
            .processes
            .into_iter()
            .map(QuarantinedProcessEntry::from)
            .collect())
    }

    async fn detector_logs(
        &self,
        since_timestamp: i64,
        limit: u32,
    ) -> Result<Vec<DetectorLogEntry>, TransportError> {
        let mut client = self.client.clone();
        let resp = client
            .get_detector_logs(proto::GetDetectorLogsRequest {
                since_timestamp,
                limit,
            })
            .await?;
        Ok(resp
            .into_inner()
            .entries
            .into_iter()
            .map(DetectorLogEntry::from)
            .collect())
    }

    async fn release_from_quarantine(
        &self,
        process_id: u32,
    ) -> Result<ReleaseOutcome, TransportError> {
        let mut client = self.client.clone();
        let resp = client
            .release_from_quarantine(proto::ReleaseFromQuarantineRequest { process_id })
            .await?;
        Ok(resp.into_inner().into())
    }

    async fn alert_stream(&self, since_timestamp: i64) -> Result<AlertStream, TransportError> {
        let mut client = self.client.clone();
        let streaming = client
            .get_alerts(proto::GetAlertsRequest { since_timestamp })
            .await?
            .into_inner();
        Ok(Box::pin(streaming.map(|item| {
            item.map(Alert::from).map_err(TransportError::from)
        })))
    }
}

/// Stand-in gateway installed when the initial connect fails: the host keeps
/// running, every call fails fast with the original unavailability reason.
pub struct UnavailableTransport {
    reason: String,
}

impl UnavailableTransport {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn err(&self) -> TransportError {
        TransportError::Unavailable(self.reason.clone())
    }
}

#[async_trait]
impl AgentTransport for UnavailableTransport {
    async fn system_health(&self) -> Result<SystemHealthSnapshot, TransportError> {
        Err(self.err())
    }

    async fn process_risk_overview(
        &self,
        _limit: u32,
    ) -> Result<Vec<ProcessRiskEntry>, TransportError> {
        Err(self.err())
    }

    async fn quarantined_processes(
        &self,
    ) -> Result<Vec<QuarantinedProcessEntry>, TransportError> {
        Err(self.err())
    }

    async fn detector_logs(
        &self,
        _since_timestamp: i64,
        _limit: u32,
    ) -> Result<Vec<DetectorLogEntry>, TransportError> {
        Err(self.err())
    }

    async fn release_from_quarantine(
        &self,
        _process_id: u32,
    ) -> Result<ReleaseOutcome, TransportError> {
        Err(self.err())
    }

    async fn alert_stream(&self, _since_timestamp: i64) -> Result<AlertStream, TransportError> {
        Err(self.err())
    }
}
