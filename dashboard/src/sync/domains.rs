//! The four domain fetchers instantiating the polling framework, and the
//! bundle that wires them to one transport gateway.

use async_trait::async_trait;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};
use tokio::task::JoinHandle;

use crate::comms::events::{
    DetectorLogEntry, ProcessRiskEntry, QuarantinedProcessEntry, SystemHealthSnapshot,
};
use crate::comms::transport::{AgentTransport, TransportError};
use crate::config::types::PollingConfig;
use crate::sync::poller::{Poller, SnapshotFetch};

pub struct HealthFetch {
    transport: Arc<dyn AgentTransport>,
}

#[async_trait]
impl SnapshotFetch for HealthFetch {
    type Snapshot = SystemHealthSnapshot;

    fn domain(&self) -> &'static str {
        "health"
    }

    async fn fetch(&self) -> Result<Self::Snapshot, TransportError> {
        self.transport.system_health().await
    }
}

pub struct RiskFetch {
    transport: Arc<dyn AgentTransport>,
    limit: u32,
}

#[async_trait]
impl SnapshotFetch for RiskFetch {
    type Snapshot = Vec<ProcessRiskEntry>;

    fn domain(&self) -> &'static str {
        "risk"
    }

    async fn fetch(&self) -> Result<Self::Snapshot, TransportError> {
        self.transport.process_risk_overview(self.limit).await
    }
}

pub struct QuarantineFetch {
    transport: Arc<dyn AgentTransport>,
}

#[async_trait]
impl SnapshotFetch for QuarantineFetch {
    type Snapshot = Vec<QuarantinedProcessEntry>;

    fn domain(&self) -> &'static str {
        "quarantine"
    }

    async fn fetch(&self) -> Result<Self::Snapshot, TransportError> {
        self.transport.quarantined_processes().await
    }
}

/// Incremental log fetcher. The upstream request only asks for entries past
/// the watermark; the snapshot handed to the cache is the accumulated
/// history (newest first, capped), so the cache itself still replaces
/// atomically like every other domain.
pub struct LogFetch {
    transport: Arc<dyn AgentTransport>,
    limit: u32,
    history_limit: usize,
    watermark: AtomicI64,
    history: Mutex<Vec<DetectorLogEntry>>,
}

impl LogFetch {
    pub fn watermark(&self) -> i64 {
        self.watermark.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotFetch for LogFetch {
    type Snapshot = Vec<DetectorLogEntry>;

    fn domain(&self) -> &'static str {
        "logs"
    }

    async fn fetch(&self) -> Result<Self::Snapshot, TransportError> {
        let since = self.watermark.load(Ordering::SeqCst);
        let entries = self.transport.detector_logs(since, self.limit).await?;

        // An empty fetch never regresses the watermark; fetch_max also
        // guards against an out-of-order batch moving it backwards.
        if let Some(newest) = entries.iter().map(|e| e.timestamp).max() {
            self.watermark.fetch_max(newest, Ordering::SeqCst);
        }

        let mut history = self.history.lock().unwrap();
        let mut merged = entries;
        merged.extend(history.iter().cloned());
        merged.truncate(self.history_limit);
        *history = merged.clone();
        Ok(merged)
    }
}

pub type HealthPoller = Poller<HealthFetch>;
pub type RiskPoller = Poller<RiskFetch>;
pub type QuarantinePoller = Poller<QuarantineFetch>;
pub type LogPoller = Poller<LogFetch>;

/// All four pollers over one gateway.
#[derive(Clone)]
pub struct Pollers {
    pub health: Arc<HealthPoller>,
    pub risk: Arc<RiskPoller>,
    pub quarantine: Arc<QuarantinePoller>,
    pub logs: Arc<LogPoller>,
}

impl Pollers {
    pub fn new(transport: Arc<dyn AgentTransport>, cfg: &PollingConfig) -> Self {
        Self {
            health: Arc::new(Poller::new(HealthFetch {
                transport: Arc::clone(&transport),
            })),
            risk: Arc::new(Poller::new(RiskFetch {
                transport: Arc::clone(&transport),
                limit: cfg.risk_limit,
            })),
            quarantine: Arc::new(Poller::new(QuarantineFetch {
                transport: Arc::clone(&transport),
            })),
            logs: Arc::new(Poller::new(LogFetch {
                transport,
                limit: cfg.log_limit,
                history_limit: cfg.log_history_limit,
                watermark: AtomicI64::new(0),
                history: Mutex::new(Vec::new()),
            })),
        }
    }

    /// Launch every domain on its configured cadence.
    pub fn spawn_all(&self, cfg: &PollingConfig) -> Vec<JoinHandle<()>> {
        vec![
            Poller::spawn(Arc::clone(&self.health), cfg.health_interval()),
            Poller::spawn(Arc::clone(&self.risk), cfg.risk_interval()),
            Poller::spawn(Arc::clone(&self.quarantine), cfg.quarantine_interval()),
            Poller::spawn(Arc::clone(&self.logs), cfg.logs_interval()),
        ]
    }
}
