//! Schedule — a recurring weekly on/off rule associated with exactly one relay.
//!
//! The engine owns only the data model and validation of schedules. Matching
//! them against wall-clock day/time and actuating the relay happens on the
//! device.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::RelayId;
use crate::time::TimeOfDay;

/// Days a schedule repeats on, in the store's three-letter form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];
}

/// A recurring rule: turn the target relay on at `on_time` and off at
/// `off_time` on the selected days.
///
/// Keyed independently of relay identity, but at most one schedule may
/// reference a given `relay_id`; the schedule repository enforces that by
/// resolving existing records before every write. Field names are the store
/// wire format (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub relay_id: RelayId,
    pub on_time: TimeOfDay,
    pub off_time: TimeOfDay,
    /// Empty means the rule never repeats; the record may still be kept
    /// around disabled.
    #[serde(default)]
    pub days: BTreeSet<Weekday>,
    pub enabled: bool,
}

impl Schedule {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptySelection`] when the schedule targets
    /// no relay.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.relay_id.as_str().is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        Ok(())
    }
}
