//! Timer watchdog — fires the compensating off-write when relay timers
//! expire.
//!
//! A single task per device waits on whichever comes first: the published
//! snapshot changing, or the earliest pending deadline elapsing. Every wake
//! re-reads the latest snapshot before acting, so a stale wait can never act
//! on cancelled or already-handled timers — re-arming on every snapshot
//! change is the sole cancellation mechanism. One evaluation covers the
//! whole due set in one atomic batch, not just the timer that armed the
//! wait, since several deadlines may coincide or drift past together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use relayhub_domain::error::HubError;
use relayhub_domain::id::DeviceId;
use relayhub_domain::snapshot::Snapshot;
use relayhub_domain::time::UnixSeconds;

use crate::ports::{Clock, StateStore, WriteBatch};
use crate::writes;

/// How soon a failed compensating write is re-evaluated. Also bounds the
/// latency added on top of a timer's nominal deadline.
const RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// The watchdog task for one device.
pub struct TimerWatchdog<S, C> {
    store: S,
    clock: C,
    device_id: DeviceId,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl<S: StateStore, C: Clock> TimerWatchdog<S, C> {
    /// Create a watchdog over the published snapshot of one device.
    pub fn new(
        store: S,
        clock: C,
        device_id: DeviceId,
        snapshots: watch::Receiver<Arc<Snapshot>>,
    ) -> Self {
        Self {
            store,
            clock,
            device_id,
            snapshots,
        }
    }

    /// Drive the watchdog until the snapshot channel closes.
    ///
    /// Each iteration evaluates the latest snapshot: fire the due set if any,
    /// then wait for either a newer snapshot or the next deadline. A
    /// successful fire surfaces back as a store notification, which replaces
    /// the snapshot and re-arms the wait; a failed fire is retried on a
    /// bounded tick against whatever snapshot is latest by then.
    pub async fn run(mut self) {
        loop {
            let snapshot = self.snapshots.borrow_and_update().clone();
            let now = self.clock.now();

            let retry = match self.fire_due(&snapshot, now).await {
                Ok(_) => false,
                Err(err) => {
                    warn!(error = %err, "compensating write failed, retrying");
                    true
                }
            };

            let deadline = snapshot.next_deadline(now);
            tokio::select! {
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        // Publisher gone: deterministic teardown path.
                        debug!("snapshot channel closed, watchdog stopping");
                        return;
                    }
                }
                () = wait_until(deadline, now, retry) => {}
            }
        }
    }

    /// Issue one batched write turning off every relay whose timer is due.
    ///
    /// The write names absolute target values (`status = false`,
    /// `timer_off_at = 0`, `last_changed = now`), so repeating it against an
    /// unchanged snapshot converges instead of compounding.
    async fn fire_due(&self, snapshot: &Snapshot, now: UnixSeconds) -> Result<usize, HubError> {
        let due = snapshot.due_relays(now);
        if due.is_empty() {
            return Ok(0);
        }

        let mut batch = WriteBatch::new();
        for relay_id in &due {
            writes::relay_off(&mut batch, &self.device_id, relay_id, now);
        }
        debug!(count = due.len(), now, "firing due timers");
        self.store.write_many(batch).await?;
        Ok(due.len())
    }
}

/// Sleep until the armed deadline, forever when none is armed, or for one
/// retry tick after a failed write.
async fn wait_until(deadline: Option<UnixSeconds>, now: UnixSeconds, retry: bool) {
    if retry {
        tokio::time::sleep(RETRY_INTERVAL).await;
        return;
    }
    match deadline {
        Some(at) => tokio::time::sleep(Duration::from_secs(at.saturating_sub(now))).await,
        None => std::future::pending().await,
    }
}
