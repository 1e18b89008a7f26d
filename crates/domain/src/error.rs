//! Common error types used across the workspace.
//!
//! Each layer defines typed errors here and converts via `#[from]`; no layer
//! matches on strings. The taxonomy separates bad caller input
//! ([`ValidationError`], rejected before any write), transient store trouble
//! ([`PersistenceError`], surfaced to the caller and retried where
//! idempotent), and internal assertion failures ([`ConsistencyViolation`],
//! impossible by construction and treated as defects when observed).

use crate::id::{RelayId, ScheduleId};
use crate::time::UnixSeconds;

/// Base error enum for the workspace.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("persistence error")]
    Persistence(#[from] PersistenceError),

    #[error("consistency violation")]
    Consistency(#[from] ConsistencyViolation),
}

/// Bad caller input, rejected before any write is issued. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// An operation over a relay selection received an empty selection.
    #[error("relay selection is empty")]
    EmptySelection,

    /// A timer was requested with a zero-length duration.
    #[error("timer duration must be greater than zero seconds")]
    NonPositiveDuration,

    /// The targeted relay does not exist in the current snapshot.
    #[error("unknown relay: {0}")]
    UnknownRelay(RelayId),

    /// A `HH:MM` time of day failed to parse or was out of range.
    #[error("invalid time of day: {0:?}")]
    InvalidTimeOfDay(String),

    /// A record requires a non-empty name.
    #[error("name must not be empty")]
    EmptyName,
}

/// A referenced record does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} not found: {id}")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Transient store failure. Callers surface it to the user; the watchdog's
/// own writes retry on the next evaluation cycle instead.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// A write to the store was rejected or lost.
    #[error("store write failed: {0}")]
    WriteFailed(String),

    /// A subscription could not be established or was torn down.
    #[error("store subscription failed: {0}")]
    SubscribeFailed(String),

    /// A store value did not match the expected record layout.
    #[error("failed to decode store value at {path}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be turned into a store value.
    #[error("failed to encode {entity} record")]
    Encode {
        entity: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A reachable state violated a data-model invariant. Every write this engine
/// constructs pairs the offending fields, so any occurrence is a defect, not
/// a runtime-recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConsistencyViolation {
    /// An off relay carried a pending timer.
    #[error("relay {relay} is off but carries timer_off_at={timer_off_at}")]
    OffRelayWithTimer {
        relay: RelayId,
        timer_off_at: UnixSeconds,
    },

    /// Two schedule records reference the same relay.
    #[error("relay {relay} is referenced by schedules {first} and {second}")]
    DuplicateScheduleRelay {
        relay: RelayId,
        first: ScheduleId,
        second: ScheduleId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_convert_validation_error_into_hub_error() {
        let err: HubError = ValidationError::EmptySelection.into();
        assert!(matches!(
            err,
            HubError::Validation(ValidationError::EmptySelection)
        ));
    }

    #[test]
    fn should_render_unknown_relay_with_its_key() {
        let err = ValidationError::UnknownRelay(RelayId::from("relay_9"));
        assert_eq!(err.to_string(), "unknown relay: relay_9");
    }

    #[test]
    fn should_render_off_relay_with_timer_violation() {
        let err = ConsistencyViolation::OffRelayWithTimer {
            relay: RelayId::from("relay_1"),
            timer_off_at: 105,
        };
        assert_eq!(
            err.to_string(),
            "relay relay_1 is off but carries timer_off_at=105"
        );
    }
}
