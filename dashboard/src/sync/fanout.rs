//! Subscriber fan-out: one ordered event sequence, N independently
//! lifecycled listeners.
//!
//! Each listener gets its own unbounded channel, so delivery is
//! fire-and-forget: a slow or dropped listener never blocks siblings and
//! never back-pressures the session manager. Events published before a
//! subscription existed are not replayed.
//!
//! Subscriber count deliberately does not drive the stream lifecycle;
//! start/stop ownership sits with the display surfaces (and the host
//! shutdown path, which stops unconditionally).

use log::trace;
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};
use tokio::sync::mpsc;

use crate::comms::events::StreamEvent;

/// Cheap-to-clone handle; all clones share one listener table.
#[derive(Clone, Default)]
pub struct AlertFanout {
    inner: Arc<FanoutInner>,
}

#[derive(Default)]
struct FanoutInner {
    listeners: Mutex<HashMap<u64, mpsc::UnboundedSender<StreamEvent>>>,
    next_id: AtomicU64,
}

impl AlertFanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Dropping the returned subscription (or calling
    /// [`Subscription::unsubscribe`]) detaches it; both are idempotent.
    pub fn subscribe(&self) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.listeners.lock().unwrap().insert(id, tx);
        trace!("fanout: listener {id} subscribed");
        Subscription {
            id,
            fanout: self.clone(),
            rx,
            detached: false,
        }
    }

    /// Deliver `event` to every currently registered listener, publication
    /// order preserved per listener. Listeners whose receiving end is gone
    /// are pruned in passing.
    pub fn publish(&self, event: StreamEvent) {
        let mut listeners = self.inner.listeners.lock().unwrap();
        listeners.retain(|id, tx| {
            let alive = tx.send(event.clone()).is_ok();
            if !alive {
                trace!("fanout: listener {id} gone, pruned");
            }
            alive
        });
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().unwrap().len()
    }

    fn detach(&self, id: u64) {
        self.inner.listeners.lock().unwrap().remove(&id);
    }
}

/// Capability handle for one registered listener.
pub struct Subscription {
    id: u64,
    fanout: AlertFanout,
    rx: mpsc::UnboundedReceiver<StreamEvent>,
    detached: bool,
}

impl Subscription {
    /// Next event, in publication order. `None` once detached and drained.
    pub async fn recv(&mut self) -> Option<StreamEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<StreamEvent> {
        self.rx.try_recv().ok()
    }

    /// Remove the listener. Safe to call more than once via drop.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.detached {
            self.fanout.detach(self.id);
            self.detached = true;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
