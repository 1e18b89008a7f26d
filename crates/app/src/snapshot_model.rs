//! Snapshot model — folds store notifications into a consistent [`Snapshot`].
//!
//! Two independent subscriptions feed the model: the device subtree (relays
//! plus liveness) and the schedules subtree. Each notification carries a
//! whole subtree value, so the model replaces that aggregate wholesale —
//! never merging field-by-field across notifications — and publishes a fresh
//! immutable snapshot through a `watch` channel. The snapshot's effective
//! timestamp is the newer of the two last-received notifications; cross-
//! subtree atomicity is a non-goal.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{broadcast, watch};
use tracing::{error, warn};

use relayhub_domain::device::DeviceRecord;
use relayhub_domain::id::ScheduleId;
use relayhub_domain::schedule::Schedule;
use relayhub_domain::snapshot::Snapshot;

use crate::ports::Clock;

/// Task that joins the two store subscriptions into published snapshots.
pub struct SnapshotModel<C> {
    device_rx: broadcast::Receiver<Value>,
    schedules_rx: broadcast::Receiver<Value>,
    tx: watch::Sender<Arc<Snapshot>>,
    clock: C,
}

impl<C: Clock> SnapshotModel<C> {
    /// Build a model over the device and schedules subscriptions, returning
    /// it together with the receiving side of the published snapshot.
    pub fn new(
        device_rx: broadcast::Receiver<Value>,
        schedules_rx: broadcast::Receiver<Value>,
        clock: C,
    ) -> (Self, watch::Receiver<Arc<Snapshot>>) {
        let (tx, rx) = watch::channel(Arc::new(Snapshot::default()));
        (
            Self {
                device_rx,
                schedules_rx,
                tx,
                clock,
            },
            rx,
        )
    }

    /// Drive the model until the store drops its subscriptions.
    ///
    /// Dropping the model (or returning from this loop) closes the published
    /// `watch` channel, which is the teardown signal for downstream tasks.
    pub async fn run(mut self) {
        loop {
            tokio::select! {
                notification = self.device_rx.recv() => match notification {
                    Ok(value) => self.apply_device(value),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Notifications carry absolute subtree values, so a
                        // lagged receiver only misses intermediate states.
                        warn!(skipped, "device subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                notification = self.schedules_rx.recv() => match notification {
                    Ok(value) => self.apply_schedules(value),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "schedules subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }

    /// Replace the device aggregate of the current snapshot.
    fn apply_device(&self, value: Value) {
        let record = match serde_json::from_value::<Option<DeviceRecord>>(value) {
            Ok(record) => record.unwrap_or_default(),
            Err(err) => {
                error!(error = %err, "discarding undecodable device notification");
                return;
            }
        };
        let observed_at = self.clock.now();
        self.publish(move |next| {
            next.relays = record.relays;
            next.device_online = record.online;
            next.last_update = record.last_update;
            next.observed_at = observed_at;
        });
    }

    /// Replace the schedules aggregate of the current snapshot.
    fn apply_schedules(&self, value: Value) {
        let schedules =
            match serde_json::from_value::<Option<BTreeMap<ScheduleId, Schedule>>>(value) {
                Ok(schedules) => schedules.unwrap_or_default(),
                Err(err) => {
                    error!(error = %err, "discarding undecodable schedules notification");
                    return;
                }
            };
        let observed_at = self.clock.now();
        self.publish(move |next| {
            next.schedules = schedules;
            next.observed_at = observed_at;
        });
    }

    /// Publish a new snapshot derived from the current one. Published
    /// snapshots are immutable; each update allocates a fresh `Arc`.
    fn publish(&self, update: impl FnOnce(&mut Snapshot)) {
        self.tx.send_modify(|current| {
            let mut next = Snapshot::clone(current);
            update(&mut next);
            *current = Arc::new(next);
        });
    }
}
