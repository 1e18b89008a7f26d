//! Schedule repository — CRUD over schedule records.
//!
//! Schedule records are keyed independently of relay identity, but at most
//! one record may reference a given relay. This service is the only writer of
//! schedule records and preserves that invariant by resolving an existing
//! record for the relay before every write: found records are updated in
//! place, never duplicated.

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::watch;

use relayhub_domain::error::{HubError, PersistenceError, ValidationError};
use relayhub_domain::id::{RelayId, ScheduleId};
use relayhub_domain::schedule::{Schedule, Weekday};
use relayhub_domain::snapshot::Snapshot;
use relayhub_domain::time::TimeOfDay;

use crate::paths;
use crate::ports::StateStore;

/// User-supplied schedule settings, applied to one or more relays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleForm {
    pub on_time: TimeOfDay,
    pub off_time: TimeOfDay,
    pub days: BTreeSet<Weekday>,
    pub enabled: bool,
}

impl ScheduleForm {
    fn for_relay(&self, relay_id: &RelayId) -> Schedule {
        Schedule {
            relay_id: relay_id.clone(),
            on_time: self.on_time,
            off_time: self.off_time,
            days: self.days.clone(),
            enabled: self.enabled,
        }
    }
}

/// Application service for schedule records.
pub struct ScheduleService<S> {
    store: S,
    snapshots: watch::Receiver<Arc<Snapshot>>,
}

impl<S: StateStore> ScheduleService<S> {
    /// Create a new service over the store and the published snapshot.
    pub fn new(store: S, snapshots: watch::Receiver<Arc<Snapshot>>) -> Self {
        Self { store, snapshots }
    }

    /// Apply `form` to every selected relay, returning the saved record ids
    /// in selection order.
    ///
    /// Lookup-or-create resolves independently per relay: a relay that
    /// already has a schedule gets that record updated in place; any other
    /// relay gets a freshly keyed record. Records are written one by one —
    /// each write is individually idempotent, and partial application on
    /// error is acceptable because the records are independent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySelection`] for an empty selection, or
    /// the first persistence error encountered (already-written records
    /// stay written).
    #[tracing::instrument(skip(self, form))]
    pub async fn save_schedule(
        &self,
        relay_ids: &[RelayId],
        form: &ScheduleForm,
    ) -> Result<Vec<ScheduleId>, HubError> {
        if relay_ids.is_empty() {
            return Err(ValidationError::EmptySelection.into());
        }

        let snapshot = self.snapshots.borrow().clone();
        let mut saved = Vec::with_capacity(relay_ids.len());
        let mut seen: BTreeSet<&RelayId> = BTreeSet::new();
        for relay_id in relay_ids {
            // A relay listed twice in one selection resolves once.
            if !seen.insert(relay_id) {
                continue;
            }
            let schedule = form.for_relay(relay_id);
            schedule.validate()?;
            let value =
                serde_json::to_value(&schedule).map_err(|source| PersistenceError::Encode {
                    entity: "Schedule",
                    source,
                })?;

            match snapshot.schedule_for_relay(relay_id) {
                Some((existing_id, _)) => {
                    self.store
                        .write_one(&paths::schedule(existing_id), value)
                        .await?;
                    saved.push(existing_id.clone());
                }
                None => {
                    let key = self.store.create_child(paths::SCHEDULES_ROOT, value).await?;
                    saved.push(ScheduleId::from(key));
                }
            }
        }
        Ok(saved)
    }

    /// Delete one schedule record. Deleting an id that no longer exists is a
    /// no-op success.
    ///
    /// # Errors
    ///
    /// Returns a persistence error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn delete_schedule(&self, schedule_id: &ScheduleId) -> Result<(), HubError> {
        self.store.delete(&paths::schedule(schedule_id)).await
    }

    /// Delete a multi-selection of schedule records.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error encountered; earlier deletions
    /// stay applied.
    #[tracing::instrument(skip(self))]
    pub async fn delete_schedules(&self, schedule_ids: &[ScheduleId]) -> Result<(), HubError> {
        for schedule_id in schedule_ids {
            self.delete_schedule(schedule_id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::future::Future;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;
    use crate::ports::WriteBatch;

    // ── Fake store recording schedule operations ───────────────────

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Op {
        WriteOne(String, Value),
        Create(String, Value),
        Delete(String),
    }

    #[derive(Default)]
    struct FakeStore {
        ops: Mutex<Vec<Op>>,
        next_key: Mutex<u32>,
    }

    impl FakeStore {
        fn ops(&self) -> Vec<Op> {
            self.ops.lock().unwrap().clone()
        }
    }

    impl StateStore for FakeStore {
        fn write_many(
            &self,
            _batch: WriteBatch,
        ) -> impl Future<Output = Result<(), HubError>> + Send {
            async { Ok(()) }
        }

        fn write_one(
            &self,
            path: &str,
            value: Value,
        ) -> impl Future<Output = Result<(), HubError>> + Send {
            self.ops
                .lock()
                .unwrap()
                .push(Op::WriteOne(path.to_string(), value));
            async { Ok(()) }
        }

        fn create_child(
            &self,
            collection: &str,
            value: Value,
        ) -> impl Future<Output = Result<String, HubError>> + Send {
            let mut next = self.next_key.lock().unwrap();
            *next += 1;
            let key = format!("generated_{next}");
            self.ops
                .lock()
                .unwrap()
                .push(Op::Create(collection.to_string(), value));
            async move { Ok(key) }
        }

        fn delete(&self, path: &str) -> impl Future<Output = Result<(), HubError>> + Send {
            self.ops.lock().unwrap().push(Op::Delete(path.to_string()));
            async { Ok(()) }
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn form() -> ScheduleForm {
        ScheduleForm {
            on_time: "07:00".parse().unwrap(),
            off_time: "22:00".parse().unwrap(),
            days: BTreeSet::from([Weekday::Mon]),
            enabled: true,
        }
    }

    fn snapshot_with_schedules(entries: Vec<(&str, &str)>) -> Arc<Snapshot> {
        Arc::new(Snapshot {
            schedules: entries
                .into_iter()
                .map(|(schedule_id, relay_id)| {
                    (
                        ScheduleId::from(schedule_id),
                        form().for_relay(&RelayId::from(relay_id)),
                    )
                })
                .collect::<BTreeMap<_, _>>(),
            ..Snapshot::default()
        })
    }

    fn service(snapshot: Arc<Snapshot>) -> ScheduleService<FakeStore> {
        let (_tx, rx) = watch::channel(snapshot);
        ScheduleService::new(FakeStore::default(), rx)
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_create_record_for_relay_without_schedule() {
        let svc = service(snapshot_with_schedules(vec![]));

        let saved = svc
            .save_schedule(&[RelayId::from("relay_2")], &form())
            .await
            .unwrap();

        assert_eq!(saved, vec![ScheduleId::from("generated_1")]);
        let ops = svc.store.ops();
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Op::Create(collection, value) => {
                assert_eq!(collection, paths::SCHEDULES_ROOT);
                assert_eq!(value["relayId"], "relay_2");
                assert_eq!(value["onTime"], "07:00");
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_update_existing_record_in_place() {
        let svc = service(snapshot_with_schedules(vec![("s1", "relay_2")]));

        let mut updated = form();
        updated.on_time = "08:30".parse().unwrap();
        let saved = svc
            .save_schedule(&[RelayId::from("relay_2")], &updated)
            .await
            .unwrap();

        // Same record id; no new record created.
        assert_eq!(saved, vec![ScheduleId::from("s1")]);
        let ops = svc.store.ops();
        assert_eq!(ops.len(), 1);
        match &ops[0] {
            Op::WriteOne(path, value) => {
                assert_eq!(path, "schedules/s1");
                assert_eq!(value["onTime"], "08:30");
                assert_eq!(value["relayId"], "relay_2");
            }
            other => panic!("expected write, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_resolve_lookup_or_create_per_relay_in_multi_save() {
        let svc = service(snapshot_with_schedules(vec![("s1", "relay_1")]));

        let saved = svc
            .save_schedule(&[RelayId::from("relay_1"), RelayId::from("relay_2")], &form())
            .await
            .unwrap();

        assert_eq!(
            saved,
            vec![ScheduleId::from("s1"), ScheduleId::from("generated_1")]
        );
        let ops = svc.store.ops();
        assert!(matches!(&ops[0], Op::WriteOne(path, _) if path == "schedules/s1"));
        assert!(matches!(&ops[1], Op::Create(_, _)));
    }

    #[tokio::test]
    async fn should_resolve_duplicate_selection_once() {
        let svc = service(snapshot_with_schedules(vec![]));

        let saved = svc
            .save_schedule(&[RelayId::from("relay_1"), RelayId::from("relay_1")], &form())
            .await
            .unwrap();

        assert_eq!(saved.len(), 1);
        assert_eq!(svc.store.ops().len(), 1);
    }

    #[tokio::test]
    async fn should_reject_empty_selection() {
        let svc = service(snapshot_with_schedules(vec![]));
        let result = svc.save_schedule(&[], &form()).await;
        assert!(matches!(
            result,
            Err(HubError::Validation(ValidationError::EmptySelection))
        ));
        assert!(svc.store.ops().is_empty());
    }

    #[tokio::test]
    async fn should_delete_by_record_path() {
        let svc = service(snapshot_with_schedules(vec![("s1", "relay_1")]));
        svc.delete_schedule(&ScheduleId::from("s1")).await.unwrap();
        assert_eq!(svc.store.ops(), vec![Op::Delete("schedules/s1".to_string())]);
    }

    #[tokio::test]
    async fn should_treat_delete_of_absent_id_as_success() {
        let svc = service(snapshot_with_schedules(vec![]));
        // The store's delete is a no-op for absent nodes; nothing to resolve.
        svc.delete_schedule(&ScheduleId::from("ghost")).await.unwrap();
    }

    #[tokio::test]
    async fn should_delete_each_record_of_a_multi_selection() {
        let svc = service(snapshot_with_schedules(vec![("s1", "r1"), ("s2", "r2")]));
        svc.delete_schedules(&[ScheduleId::from("s1"), ScheduleId::from("s2")])
            .await
            .unwrap();
        assert_eq!(
            svc.store.ops(),
            vec![
                Op::Delete("schedules/s1".to_string()),
                Op::Delete("schedules/s2".to_string()),
            ]
        );
    }
}
