//! Stream session manager: owns the single long-lived alert stream.
//!
//! State machine: `Idle → Connecting → Active → (Stopped | Errored)`.
//! Exactly one underlying streaming call exists at any time; `start` while
//! a call is up tears it down first, and the teardown awaits the forwarding
//! task so old and new calls can never interleave deliveries. A
//! self-initiated cancellation (or a transport error carrying the cancelled
//! condition) transitions silently to `Stopped`; listeners only ever see a
//! `TerminalError` for genuine failures, and the manager never auto-retries.

use futures::StreamExt;
use log::{debug, warn};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;

use crate::comms::events::{StreamEvent, StreamFailure};
use crate::comms::transport::{AgentTransport, AlertStream, TransportError};
use crate::sync::fanout::AlertFanout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Active,
    Stopped,
    Errored,
}

struct ActiveCall {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

pub struct StreamSession {
    transport: Arc<dyn AgentTransport>,
    fanout: AlertFanout,
    // Serializes start/stop; holding it across teardown is what makes
    // restart single-flight rather than a race.
    slot: Mutex<Option<ActiveCall>>,
    state: Arc<StdMutex<SessionState>>,
}

impl StreamSession {
    pub fn new(transport: Arc<dyn AgentTransport>, fanout: AlertFanout) -> Self {
        Self {
            transport,
            fanout,
            slot: Mutex::new(None),
            state: Arc::new(StdMutex::new(SessionState::Idle)),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.lock().unwrap()
    }

    pub fn fanout(&self) -> &AlertFanout {
        &self.fanout
    }

    /// Open (or re-open) the alert stream seeded at `since_timestamp`.
    /// Any previous call is torn down to completion first. An open failure
    /// is returned to the caller *and* published as a terminal error, so
    /// already-attached display surfaces learn about it too.
    pub async fn start(&self, since_timestamp: i64) -> Result<(), TransportError> {
        let mut slot = self.slot.lock().await;
        teardown(&mut slot).await;

        self.set_state(SessionState::Connecting);
        debug!("session: opening alert stream since={since_timestamp}");

        let stream = match self.transport.alert_stream(since_timestamp).await {
            Ok(stream) => stream,
            Err(e) if e.is_cancelled() => {
                self.set_state(SessionState::Stopped);
                return Err(e);
            }
            Err(e) => {
                warn!("session: stream open failed: {e}");
                self.set_state(SessionState::Errored);
                self.fanout
                    .publish(StreamEvent::TerminalError(StreamFailure::new(e.to_string())));
                return Err(e);
            }
        };

        // Transport established the call; delivery may still be pending.
        self.set_state(SessionState::Active);

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let task = tokio::spawn(forward(
            stream,
            self.fanout.clone(),
            Arc::clone(&self.state),
            cancel_rx,
        ));
        *slot = Some(ActiveCall {
            cancel: cancel_tx,
            task,
        });
        Ok(())
    }

    /// Cancel the underlying call and wait for the forwarding task to
    /// finish. No-op from `Idle`/`Stopped`; safe to call repeatedly and
    /// concurrently with `start` (both serialize on the session lock).
    pub async fn stop(&self) {
        let mut slot = self.slot.lock().await;
        let had_call = slot.is_some();
        teardown(&mut slot).await;
        if had_call {
            self.set_state(SessionState::Stopped);
            debug!("session: stopped");
        }
    }

    fn set_state(&self, next: SessionState) {
        *self.state.lock().unwrap() = next;
    }
}

/// Cancel and await the current call, if any. Dropping the stream inside
/// the task closes the underlying transport call.
async fn teardown(slot: &mut Option<ActiveCall>) {
    if let Some(call) = slot.take() {
        // Send fails if the task already exited on its own; either way the
        // join below guarantees no further publications from this call.
        let _ = call.cancel.send(());
        let _ = call.task.await;
    }
}

async fn forward(
    mut stream: AlertStream,
    fanout: AlertFanout,
    state: Arc<StdMutex<SessionState>>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let set = |next: SessionState| *state.lock().unwrap() = next;
    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                // Own cancellation signal: silent stop, nothing published.
                set(SessionState::Stopped);
                return;
            }
            item = stream.next() => match item {
                Some(Ok(alert)) => {
                    set(SessionState::Active);
                    fanout.publish(StreamEvent::Alert(alert));
                }
                Some(Err(e)) if e.is_cancelled() => {
                    set(SessionState::Stopped);
                    return;
                }
                Some(Err(e)) => {
                    warn!("session: stream terminated: {e}");
                    fanout.publish(StreamEvent::TerminalError(StreamFailure::new(
                        e.to_string(),
                    )));
                    set(SessionState::Errored);
                    return;
                }
                None => {
                    // Upstream closed cleanly.
                    debug!("session: stream ended");
                    set(SessionState::Stopped);
                    return;
                }
            }
        }
    }
}
