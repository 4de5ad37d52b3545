//! Action gateway: the one mutating command the dashboard can issue.

use log::{info, warn};
use std::sync::Arc;

use crate::comms::events::ReleaseOutcome;
use crate::comms::transport::{AgentTransport, TransportError};
use crate::sync::domains::QuarantinePoller;

pub struct ActionGateway {
    transport: Arc<dyn AgentTransport>,
    quarantine: Arc<QuarantinePoller>,
}

impl ActionGateway {
    pub fn new(transport: Arc<dyn AgentTransport>, quarantine: Arc<QuarantinePoller>) -> Self {
        Self {
            transport,
            quarantine,
        }
    }

    /// Release `process_id` from quarantine. A transport failure is
    /// returned as-is and leaves the quarantine cache untouched. When the
    /// agent reports success, the quarantine poller is force-ticked so the
    /// display reflects the release without waiting a full cadence; the
    /// refresh is the poller's ordinary `tick`, nothing action-specific.
    pub async fn release_from_quarantine(
        &self,
        process_id: u32,
    ) -> Result<ReleaseOutcome, TransportError> {
        let outcome = self.transport.release_from_quarantine(process_id).await?;
        if outcome.success {
            info!("action: released pid {process_id} from quarantine");
            self.quarantine.tick().await;
        } else {
            warn!(
                "action: agent refused release of pid {process_id}: {}",
                outcome.message
            );
        }
        Ok(outcome)
    }
}
