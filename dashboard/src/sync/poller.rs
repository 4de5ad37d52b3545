//! Polling fetcher framework: one periodic-refresh primitive, instantiated
//! once per data domain.
//!
//! Each poller keeps a [`DomainState`]: the last good snapshot plus the
//! error message of the last failed tick. Ticks are single-flight per
//! domain: a tick that lands while a fetch is outstanding is dropped, not
//! queued, which bounds concurrency and keeps late responses from
//! thrashing the cache. There is no jitter and no backoff: a failed tick is
//! simply retried at the next cadence, and the recorded error tells the
//! operator the snapshot may be stale.

use async_trait::async_trait;
use log::{debug, warn};
use serde::Serialize;
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::comms::transport::TransportError;

/// One domain's fetch operation. Implementations own whatever request state
/// the domain needs (limits, the log watermark, ...).
#[async_trait]
pub trait SnapshotFetch: Send + Sync + 'static {
    type Snapshot: Clone + Default + Send + Sync + 'static;

    /// Domain name for logs.
    fn domain(&self) -> &'static str;

    async fn fetch(&self) -> Result<Self::Snapshot, TransportError>;
}

/// What readers see: the last successful snapshot (or the default before the
/// first success) and the last tick's failure, if any. Replaced as a whole,
/// never field by field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainState<T> {
    pub value: T,
    pub error: Option<String>,
}

pub struct Poller<F: SnapshotFetch> {
    fetch: F,
    state: RwLock<DomainState<F::Snapshot>>,
    in_flight: AtomicBool,
}

impl<F: SnapshotFetch> Poller<F> {
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            state: RwLock::new(DomainState::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    /// Clone out the current state. Always a complete snapshot.
    pub fn snapshot(&self) -> DomainState<F::Snapshot> {
        self.state.read().unwrap().clone()
    }

    /// One refresh attempt. Returns `false` if it was dropped because a
    /// fetch for this domain was already outstanding. Callable out of
    /// cadence (the action gateway's forced refresh goes through here too).
    pub async fn tick(&self) -> bool {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            debug!("poller[{}]: tick dropped, fetch in flight", self.fetch.domain());
            return false;
        }

        let result = self.fetch.fetch().await;
        {
            let mut state = self.state.write().unwrap();
            match result {
                Ok(value) => {
                    state.value = value;
                    state.error = None;
                }
                Err(e) => {
                    warn!("poller[{}]: fetch failed: {e}", self.fetch.domain());
                    state.error = Some(e.to_string());
                }
            }
        }

        self.in_flight.store(false, Ordering::SeqCst);
        true
    }

    /// Run `tick` on a fixed cadence; the first tick fires immediately so a
    /// fresh host gets data without waiting a full interval.
    pub fn spawn(poller: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                poller.tick().await;
            }
        })
    }
}
