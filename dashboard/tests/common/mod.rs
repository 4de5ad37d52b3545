//! Scripted transport double shared by the integration tests.
//!
//! Each unary method pops the next scripted response (or returns a benign
//! default when nothing is scripted) and counts its calls; `alert_stream`
//! hands out a channel-backed stream per call so tests can drive delivery
//! and observe teardown (a closed sender means the session dropped that
//! call's stream).

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::wrappers::UnboundedReceiverStream;

use dashboard::comms::events::{
    Alert, DetectorLogEntry, ProcessRiskEntry, QuarantinedProcessEntry, ReleaseOutcome,
    SystemHealthSnapshot,
};
use dashboard::comms::transport::{AgentTransport, AlertStream, TransportError};

type Scripted<T> = Mutex<VecDeque<Result<T, TransportError>>>;

#[derive(Default)]
pub struct MockTransport {
    health: Scripted<SystemHealthSnapshot>,
    health_calls: AtomicUsize,
    health_gate: Mutex<Option<oneshot::Receiver<()>>>,
    risk: Scripted<Vec<ProcessRiskEntry>>,
    quarantine: Scripted<Vec<QuarantinedProcessEntry>>,
    quarantine_calls: AtomicUsize,
    logs: Scripted<Vec<DetectorLogEntry>>,
    log_sinces: Mutex<Vec<i64>>,
    release: Scripted<ReleaseOutcome>,
    release_calls: AtomicUsize,
    stream_sinces: Mutex<Vec<i64>>,
    stream_senders: Mutex<Vec<mpsc::UnboundedSender<Result<Alert, TransportError>>>>,
    stream_open_errors: Mutex<VecDeque<TransportError>>,
}

impl MockTransport {
    pub fn script_health(&self, r: Result<SystemHealthSnapshot, TransportError>) {
        self.health.lock().unwrap().push_back(r);
    }

    /// Make the next health fetch park until the sender side fires.
    pub fn gate_health(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.health_gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn script_risk(&self, r: Result<Vec<ProcessRiskEntry>, TransportError>) {
        self.risk.lock().unwrap().push_back(r);
    }

    pub fn script_quarantine(&self, r: Result<Vec<QuarantinedProcessEntry>, TransportError>) {
        self.quarantine.lock().unwrap().push_back(r);
    }

    pub fn script_logs(&self, r: Result<Vec<DetectorLogEntry>, TransportError>) {
        self.logs.lock().unwrap().push_back(r);
    }

    pub fn script_release(&self, r: Result<ReleaseOutcome, TransportError>) {
        self.release.lock().unwrap().push_back(r);
    }

    pub fn script_stream_open_error(&self, e: TransportError) {
        self.stream_open_errors.lock().unwrap().push_back(e);
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn quarantine_calls(&self) -> usize {
        self.quarantine_calls.load(Ordering::SeqCst)
    }

    pub fn release_calls(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub fn log_sinces(&self) -> Vec<i64> {
        self.log_sinces.lock().unwrap().clone()
    }

    pub fn stream_sinces(&self) -> Vec<i64> {
        self.stream_sinces.lock().unwrap().clone()
    }

    /// Sender feeding the `n`-th opened stream (0-based).
    pub fn stream_sender(
        &self,
        n: usize,
    ) -> mpsc::UnboundedSender<Result<Alert, TransportError>> {
        self.stream_senders.lock().unwrap()[n].clone()
    }

    pub fn streams_opened(&self) -> usize {
        self.stream_senders.lock().unwrap().len()
    }

    /// Drop the sender feeding the `n`-th stream, emulating a clean
    /// upstream close.
    pub fn close_stream(&self, n: usize) {
        let (tx, _rx) = mpsc::unbounded_channel();
        self.stream_senders.lock().unwrap()[n] = tx;
    }
}

#[async_trait]
impl AgentTransport for MockTransport {
    async fn system_health(&self) -> Result<SystemHealthSnapshot, TransportError> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.health_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        self.health
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(SystemHealthSnapshot::default()))
    }

    async fn process_risk_overview(
        &self,
        _limit: u32,
    ) -> Result<Vec<ProcessRiskEntry>, TransportError> {
        self.risk.lock().unwrap().pop_front().unwrap_or(Ok(vec![]))
    }

    async fn quarantined_processes(
        &self,
    ) -> Result<Vec<QuarantinedProcessEntry>, TransportError> {
        self.quarantine_calls.fetch_add(1, Ordering::SeqCst);
        self.quarantine
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }

    async fn detector_logs(
        &self,
        since_timestamp: i64,
        _limit: u32,
    ) -> Result<Vec<DetectorLogEntry>, TransportError> {
        self.log_sinces.lock().unwrap().push(since_timestamp);
        self.logs.lock().unwrap().pop_front().unwrap_or(Ok(vec![]))
    }

    async fn release_from_quarantine(
        &self,
        _process_id: u32,
    ) -> Result<ReleaseOutcome, TransportError> {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
        self.release
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(TransportError::Rpc("release not scripted".into())))
    }

    async fn alert_stream(&self, since_timestamp: i64) -> Result<AlertStream, TransportError> {
        if let Some(e) = self.stream_open_errors.lock().unwrap().pop_front() {
            return Err(e);
        }
        self.stream_sinces.lock().unwrap().push(since_timestamp);
        let (tx, rx) = mpsc::unbounded_channel();
        self.stream_senders.lock().unwrap().push(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}

pub fn alert(id: &str, process_id: u32) -> Alert {
    Alert {
        id: id.into(),
        timestamp: 1_700_000_000_000,
        process_id,
        process_path: r"C:\Users\Test\malware.exe".into(),
        ml_score: 0.92,
        quarantined: true,
        detectors: vec!["entropy".into(), "mass_write".into()],
    }
}

pub fn log_entry(timestamp: i64) -> DetectorLogEntry {
    DetectorLogEntry {
        detector: "entropy".into(),
        process_id: 7,
        score: 0.4,
        timestamp,
        details: "high write entropy".into(),
    }
}

pub fn quarantined(process_id: u32, reason: &str) -> QuarantinedProcessEntry {
    QuarantinedProcessEntry {
        process_id,
        process_path: r"C:\Users\Test\malware.exe".into(),
        risk_score: 0.97,
        quarantined_at: 1_700_000_000_500,
        reason: reason.into(),
    }
}
