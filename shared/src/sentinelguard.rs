//! Messages and client for the `sentinelguard.SentinelGuardService` gRPC
//! service exposed by the agent.
//!
//! All timestamps on this surface are epoch **milliseconds** (i64). That is
//! a fixed contract with the agent; nothing on the dashboard side guesses
//! units per value.

/// One detection event pushed over the `GetAlerts` stream.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Alert {
    /// Opaque event id, unique per alert.
    #[prost(string, tag = "1")]
    pub id: String,
    /// Epoch milliseconds.
    #[prost(int64, tag = "2")]
    pub timestamp: i64,
    #[prost(uint32, tag = "3")]
    pub process_id: u32,
    #[prost(string, tag = "4")]
    pub process_path: String,
    /// Model score in [0, 1].
    #[prost(double, tag = "5")]
    pub ml_score: f64,
    #[prost(bool, tag = "6")]
    pub quarantined: bool,
    /// Names of the detectors that fired for this event.
    #[prost(string, repeated, tag = "7")]
    pub detectors: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetAlertsRequest {
    /// Epoch milliseconds; 0 means "everything the agent still holds".
    #[prost(int64, tag = "1")]
    pub since_timestamp: i64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetSystemHealthRequest {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SystemHealth {
    #[prost(bool, tag = "1")]
    pub agent_running: bool,
    #[prost(bool, tag = "2")]
    pub driver_loaded: bool,
    #[prost(uint64, tag = "3")]
    pub events_per_second: u64,
    #[prost(uint64, tag = "4")]
    pub total_events: u64,
    #[prost(uint32, tag = "5")]
    pub active_processes: u32,
    #[prost(uint32, tag = "6")]
    pub quarantined_count: u32,
    /// Percentages in [0, 100].
    #[prost(double, tag = "7")]
    pub cpu_usage: f64,
    #[prost(double, tag = "8")]
    pub memory_usage: f64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetProcessRiskOverviewRequest {
    #[prost(uint32, tag = "1")]
    pub limit: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessRisk {
    #[prost(uint32, tag = "1")]
    pub process_id: u32,
    #[prost(string, tag = "2")]
    pub process_path: String,
    #[prost(double, tag = "3")]
    pub risk_score: f64,
    /// Epoch milliseconds of the last observed activity.
    #[prost(int64, tag = "4")]
    pub last_activity: i64,
    #[prost(string, repeated, tag = "5")]
    pub detectors: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProcessRiskOverview {
    #[prost(message, repeated, tag = "1")]
    pub processes: Vec<ProcessRisk>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetQuarantinedProcessesRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuarantinedProcess {
    #[prost(uint32, tag = "1")]
    pub process_id: u32,
    #[prost(string, tag = "2")]
    pub process_path: String,
    #[prost(double, tag = "3")]
    pub risk_score: f64,
    /// Epoch milliseconds at which the agent quarantined the process.
    #[prost(int64, tag = "4")]
    pub quarantined_at: i64,
    #[prost(string, tag = "5")]
    pub reason: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QuarantinedProcessesResponse {
    #[prost(message, repeated, tag = "1")]
    pub processes: Vec<QuarantinedProcess>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct GetDetectorLogsRequest {
    #[prost(int64, tag = "1")]
    pub since_timestamp: i64,
    #[prost(uint32, tag = "2")]
    pub limit: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DetectorLogEntry {
    #[prost(string, tag = "1")]
    pub detector: String,
    #[prost(uint32, tag = "2")]
    pub process_id: u32,
    #[prost(double, tag = "3")]
    pub score: f64,
    /// Epoch milliseconds.
    #[prost(int64, tag = "4")]
    pub timestamp: i64,
    #[prost(string, tag = "5")]
    pub details: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DetectorLogsResponse {
    #[prost(message, repeated, tag = "1")]
    pub entries: Vec<DetectorLogEntry>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ReleaseFromQuarantineRequest {
    #[prost(uint32, tag = "1")]
    pub process_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReleaseFromQuarantineResponse {
    #[prost(bool, tag = "1")]
    pub success: bool,
    #[prost(string, tag = "2")]
    pub message: String,
}

pub mod sentinel_guard_service_client {
    //! Hand-written equivalent of the tonic-build client stub, concrete over
    //! `tonic::transport::Channel`.

    use tonic::codegen::http::uri::PathAndQuery;
    use tonic::transport::{Channel, Endpoint};

    use super::*;

    #[derive(Debug, Clone)]
    pub struct SentinelGuardServiceClient {
        inner: tonic::client::Grpc<Channel>,
    }

    impl SentinelGuardServiceClient {
        /// Connect eagerly; fails if the endpoint is unreachable.
        pub async fn connect(endpoint: Endpoint) -> Result<Self, tonic::transport::Error> {
            let channel = endpoint.connect().await?;
            Ok(Self::new(channel))
        }

        pub fn new(channel: Channel) -> Self {
            Self {
                inner: tonic::client::Grpc::new(channel),
            }
        }

        async fn ready(&mut self) -> Result<(), tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::unavailable(format!("service was not ready: {e}"))
            })
        }

        pub async fn get_system_health(
            &mut self,
            request: GetSystemHealthRequest,
        ) -> Result<tonic::Response<SystemHealth>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/sentinelguard.SentinelGuardService/GetSystemHealth",
            );
            self.inner
                .unary(tonic::Request::new(request), path, codec)
                .await
        }

        pub async fn get_process_risk_overview(
            &mut self,
            request: GetProcessRiskOverviewRequest,
        ) -> Result<tonic::Response<ProcessRiskOverview>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/sentinelguard.SentinelGuardService/GetProcessRiskOverview",
            );
            self.inner
                .unary(tonic::Request::new(request), path, codec)
                .await
        }

        pub async fn get_quarantined_processes(
            &mut self,
            request: GetQuarantinedProcessesRequest,
        ) -> Result<tonic::Response<QuarantinedProcessesResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/sentinelguard.SentinelGuardService/GetQuarantinedProcesses",
            );
            self.inner
                .unary(tonic::Request::new(request), path, codec)
                .await
        }

        pub async fn get_detector_logs(
            &mut self,
            request: GetDetectorLogsRequest,
        ) -> Result<tonic::Response<DetectorLogsResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/sentinelguard.SentinelGuardService/GetDetectorLogs",
            );
            self.inner
                .unary(tonic::Request::new(request), path, codec)
                .await
        }

        pub async fn release_from_quarantine(
            &mut self,
            request: ReleaseFromQuarantineRequest,
        ) -> Result<tonic::Response<ReleaseFromQuarantineResponse>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path = PathAndQuery::from_static(
                "/sentinelguard.SentinelGuardService/ReleaseFromQuarantine",
            );
            self.inner
                .unary(tonic::Request::new(request), path, codec)
                .await
        }

        /// Server-streaming alert feed. Dropping the returned `Streaming`
        /// cancels the call; the agent then observes gRPC `CANCELLED`.
        pub async fn get_alerts(
            &mut self,
            request: GetAlertsRequest,
        ) -> Result<tonic::Response<tonic::codec::Streaming<Alert>>, tonic::Status> {
            self.ready().await?;
            let codec = tonic::codec::ProstCodec::default();
            let path =
                PathAndQuery::from_static("/sentinelguard.SentinelGuardService/GetAlerts");
            self.inner
                .server_streaming(tonic::Request::new(request), path, codec)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;

    #[test]
    fn alert_decodes_from_defaults() {
        // An empty buffer is a valid proto3 message: every field at default.
        let alert = Alert::decode(&[][..]).expect("empty alert");
        assert_eq!(alert.id, "");
        assert_eq!(alert.timestamp, 0);
        assert!(!alert.quarantined);
    }

    #[test]
    fn release_response_keeps_tags() {
        let resp = ReleaseFromQuarantineResponse {
            success: true,
            message: "Released".into(),
        };
        let bytes = resp.encode_to_vec();
        // tag 1 varint (success), tag 2 length-delimited (message)
        assert_eq!(bytes[0], 0x08);
        assert_eq!(bytes[2], 0x12);
        let back = ReleaseFromQuarantineResponse::decode(&bytes[..]).expect("decode");
        assert_eq!(back, resp);
    }
}
