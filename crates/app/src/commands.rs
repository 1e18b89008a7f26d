//! Command authority — validates and issues every user-initiated relay write.
//!
//! Each operation reads the latest published snapshot, validates its input
//! against it, and submits one atomic batch of absolute target values. The
//! call returns as soon as the store accepts the write; confirmation arrives
//! asynchronously through the next snapshot, never through the return value,
//! and the in-memory snapshot is left untouched on failure.

use std::sync::Arc;

use tokio::sync::watch;

use relayhub_domain::error::{HubError, ValidationError};
use relayhub_domain::id::{DeviceId, RelayId};
use relayhub_domain::snapshot::Snapshot;

use crate::ports::{Clock, StateStore, WriteBatch};
use crate::writes;

/// Application service for the five user-facing relay operations.
pub struct RelayCommands<S, C> {
    store: S,
    clock: C,
    device_id: DeviceId,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl<S: StateStore, C: Clock> RelayCommands<S, C> {
    /// Create a new command authority for one device.
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

    fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshots.borrow().clone()
    }

    /// Flip one relay. Turning it off also clears any pending timer in the
    /// same atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownRelay`] when the relay is not in the
    /// current snapshot, or a persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_relay(&self, relay_id: &RelayId) -> Result<(), HubError> {
        let snapshot = self.snapshot();
        let relay = snapshot
            .relays
            .get(relay_id)
            .ok_or_else(|| ValidationError::UnknownRelay(relay_id.clone()))?;

        let now = self.clock.now();
        let mut batch = WriteBatch::new();
        if relay.status {
            writes::relay_off(&mut batch, &self.device_id, relay_id, now);
        } else {
            writes::relay_on(&mut batch, &self.device_id, relay_id, now);
        }
        self.store.write_many(batch).await
    }

    /// Drive every relay in the snapshot to `target_status` with one atomic
    /// write. An empty snapshot is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn set_all(&self, target_status: bool) -> Result<(), HubError> {
        let snapshot = self.snapshot();
        let now = self.clock.now();
        let mut batch = WriteBatch::new();
        for relay_id in snapshot.relays.keys() {
            if target_status {
                writes::relay_on(&mut batch, &self.device_id, relay_id, now);
            } else {
                writes::relay_off(&mut batch, &self.device_id, relay_id, now);
            }
        }
        self.store.write_many(batch).await
    }

    /// Turn every relay in the snapshot on.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn all_on(&self) -> Result<(), HubError> {
        self.set_all(true).await
    }

    /// Turn every relay in the snapshot off, clearing every pending timer.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    pub async fn all_off(&self) -> Result<(), HubError> {
        self.set_all(false).await
    }

    /// Flip every relay in the snapshot with one atomic write.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_all(&self) -> Result<(), HubError> {
        let snapshot = self.snapshot();
        let now = self.clock.now();
        let mut batch = WriteBatch::new();
        for (relay_id, relay) in &snapshot.relays {
            if relay.status {
                writes::relay_off(&mut batch, &self.device_id, relay_id, now);
            } else {
                writes::relay_on(&mut batch, &self.device_id, relay_id, now);
            }
        }
        self.store.write_many(batch).await
    }

    /// Turn each selected relay on with a one-shot off deadline of
    /// `now + duration_seconds`. A new timer always supersedes any prior
    /// timer on the same relay.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySelection`] for an empty selection,
    /// [`ValidationError::NonPositiveDuration`] for a zero duration,
    /// [`ValidationError::UnknownRelay`] for a relay not in the current
    /// snapshot (in which case nothing is written), or a persistence error
    /// from the store.
    #[tracing::instrument(skip(self))]
    pub async fn start_timer(
        &self,
        relay_ids: &[RelayId],
        duration_seconds: u64,
    ) -> Result<(), HubError> {
        if relay_ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }
        if duration_seconds == 0 {
            return Err(ValidationError::NonPositiveDuration.into());
        }

        let snapshot = self.snapshot();
        for relay_id in relay_ids {
            if !snapshot.relays.contains_key(relay_id) {
                return Err(ValidationError::UnknownRelay(relay_id.clone()).into());
            }
        }

        let now = self.clock.now();
        let off_at = now + duration_seconds;
        let mut batch = WriteBatch::new();
        for relay_id in relay_ids {
            writes::relay_on_with_timer(&mut batch, &self.device_id, relay_id, off_at, now);
        }
        self.store.write_many(batch).await
    }
}
