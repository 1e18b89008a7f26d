//! Snapshot — an immutable, point-in-time join of relay, timer, and schedule
//! state.
//!
//! All downstream reasoning (watchdog, command authority, schedule
//! repository) happens against a published snapshot, never against in-flight
//! store values, so partially-applied multi-key writes are never observed.
//! A snapshot is replaced wholesale on each store notification; published
//! snapshots are never mutated in place.

use std::collections::BTreeMap;

use crate::error::ConsistencyViolation;
use crate::id::{RelayId, ScheduleId};
use crate::relay::Relay;
use crate::schedule::Schedule;
use crate::time::UnixSeconds;

/// Point-in-time join of the device and schedules subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub relays: BTreeMap<RelayId, Relay>,
    pub schedules: BTreeMap<ScheduleId, Schedule>,
    pub device_online: bool,
    pub last_update: Option<UnixSeconds>,
    /// When the newest of the two folded subtree notifications arrived.
    /// The two subtrees are independent aggregates, so minor skew between
    /// them is tolerated.
    pub observed_at: UnixSeconds,
}

impl Snapshot {
    /// Every relay whose timer is due at `now`, in key order.
    ///
    /// Multiple timers may coincide or have drifted past together; an
    /// evaluation always covers the whole due set, not just the nearest.
    #[must_use]
    pub fn due_relays(&self, now: UnixSeconds) -> Vec<&RelayId> {
        self.relays
            .iter()
            .filter(|(_, relay)| relay.timer_due(now))
            .map(|(id, _)| id)
            .collect()
    }

    /// The earliest pending deadline strictly after `now`, if any timer is
    /// armed.
    #[must_use]
    pub fn next_deadline(&self, now: UnixSeconds) -> Option<UnixSeconds> {
        self.relays
            .values()
            .filter(|relay| relay.has_active_timer(now))
            .map(|relay| relay.timer_off_at)
            .min()
    }

    /// Relays with a timer still counting down, in key order.
    #[must_use]
    pub fn active_timers(&self, now: UnixSeconds) -> Vec<(&RelayId, &Relay)> {
        self.relays
            .iter()
            .filter(|(_, relay)| relay.has_active_timer(now))
            .collect()
    }

    /// How many relays are currently energized.
    #[must_use]
    pub fn active_relay_count(&self) -> usize {
        self.relays.values().filter(|relay| relay.status).count()
    }

    /// The at-most-one schedule referencing `relay_id`.
    #[must_use]
    pub fn schedule_for_relay(&self, relay_id: &RelayId) -> Option<(&ScheduleId, &Schedule)> {
        self.schedules
            .iter()
            .find(|(_, schedule)| schedule.relay_id == *relay_id)
    }

    /// Verify the testable data-model invariants: off-implies-no-timer and
    /// schedule uniqueness.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConsistencyViolation`] found.
    pub fn check_invariants(&self) -> Result<(), ConsistencyViolation> {
        for (id, relay) in &self.relays {
            if !relay.holds_invariant() {
                return Err(ConsistencyViolation::OffRelayWithTimer {
                    relay: id.clone(),
                    timer_off_at: relay.timer_off_at,
                });
            }
        }

        let mut seen: BTreeMap<&RelayId, &ScheduleId> = BTreeMap::new();
        for (id, schedule) in &self.schedules {
            if let Some(first) = seen.insert(&schedule.relay_id, id) {
                return Err(ConsistencyViolation::DuplicateScheduleRelay {
                    relay: schedule.relay_id.clone(),
                    first: first.clone(),
                    second: id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::relay::NO_TIMER;

    fn relay(status: bool, timer_off_at: UnixSeconds) -> Relay {
        Relay {
            name: "Relay".to_string(),
            status,
            last_changed: 0,
            timer_off_at,
        }
    }

    fn schedule(relay_id: &str) -> Schedule {
        Schedule {
            relay_id: RelayId::from(relay_id),
            on_time: "07:00".parse().unwrap(),
            off_time: "22:00".parse().unwrap(),
            days: BTreeSet::new(),
            enabled: true,
        }
    }

    fn snapshot(relays: Vec<(&str, Relay)>) -> Snapshot {
        Snapshot {
            relays: relays
                .into_iter()
                .map(|(id, relay)| (RelayId::from(id), relay))
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn should_collect_whole_due_set_including_boundary() {
        let snap = snapshot(vec![
            ("relay_1", relay(true, 105)),
            ("relay_2", relay(true, 103)),
            ("relay_3", relay(true, 110)),
            ("relay_4", relay(true, NO_TIMER)),
        ]);
        let due = snap.due_relays(105);
        assert_eq!(
            due,
            vec![&RelayId::from("relay_1"), &RelayId::from("relay_2")]
        );
    }

    #[test]
    fn should_not_consider_off_relays_due() {
        let snap = snapshot(vec![("relay_1", relay(false, 105))]);
        assert!(snap.due_relays(110).is_empty());
    }

    #[test]
    fn should_pick_earliest_future_deadline() {
        let snap = snapshot(vec![
            ("relay_1", relay(true, 105)),
            ("relay_2", relay(true, 110)),
        ]);
        assert_eq!(snap.next_deadline(100), Some(105));
    }

    #[test]
    fn should_have_no_deadline_when_all_timers_elapsed_or_absent() {
        let snap = snapshot(vec![
            ("relay_1", relay(true, 105)),
            ("relay_2", relay(true, NO_TIMER)),
        ]);
        assert_eq!(snap.next_deadline(105), None);
        assert_eq!(snap.next_deadline(200), None);
    }

    #[test]
    fn should_ignore_off_relays_for_deadline() {
        let snap = snapshot(vec![("relay_1", relay(false, NO_TIMER))]);
        assert_eq!(snap.next_deadline(100), None);
    }

    #[test]
    fn should_list_active_timers_and_count_energized_relays() {
        let snap = snapshot(vec![
            ("relay_1", relay(true, 105)),
            ("relay_2", relay(true, NO_TIMER)),
            ("relay_3", relay(false, NO_TIMER)),
        ]);
        let active = snap.active_timers(100);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0, &RelayId::from("relay_1"));
        assert_eq!(snap.active_relay_count(), 2);
    }

    #[test]
    fn should_find_the_schedule_for_a_relay() {
        let mut snap = snapshot(vec![]);
        snap.schedules
            .insert(ScheduleId::from("s1"), schedule("relay_1"));
        snap.schedules
            .insert(ScheduleId::from("s2"), schedule("relay_2"));

        let (id, found) = snap.schedule_for_relay(&RelayId::from("relay_2")).unwrap();
        assert_eq!(id, &ScheduleId::from("s2"));
        assert_eq!(found.relay_id, RelayId::from("relay_2"));
        assert!(snap.schedule_for_relay(&RelayId::from("relay_9")).is_none());
    }

    #[test]
    fn should_accept_consistent_snapshot() {
        let mut snap = snapshot(vec![
            ("relay_1", relay(true, 105)),
            ("relay_2", relay(false, NO_TIMER)),
        ]);
        snap.schedules
            .insert(ScheduleId::from("s1"), schedule("relay_1"));
        snap.schedules
            .insert(ScheduleId::from("s2"), schedule("relay_2"));
        assert!(snap.check_invariants().is_ok());
    }

    #[test]
    fn should_flag_off_relay_with_pending_timer() {
        let snap = snapshot(vec![("relay_1", relay(false, 105))]);
        assert_eq!(
            snap.check_invariants(),
            Err(ConsistencyViolation::OffRelayWithTimer {
                relay: RelayId::from("relay_1"),
                timer_off_at: 105,
            })
        );
    }

    #[test]
    fn should_flag_duplicate_schedules_for_one_relay() {
        let mut snap = snapshot(vec![]);
        snap.schedules
            .insert(ScheduleId::from("s1"), schedule("relay_1"));
        snap.schedules
            .insert(ScheduleId::from("s2"), schedule("relay_1"));
        assert_eq!(
            snap.check_invariants(),
            Err(ConsistencyViolation::DuplicateScheduleRelay {
                relay: RelayId::from("relay_1"),
                first: ScheduleId::from("s1"),
                second: ScheduleId::from("s2"),
            })
        );
    }
}
