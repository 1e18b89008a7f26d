//! Relay — a controllable on/off output channel on the device.

use serde::{Deserialize, Serialize};

use crate::time::UnixSeconds;

/// Sentinel for "no pending timer". The device wire format stores `0` rather
/// than omitting the field.
pub const NO_TIMER: UnixSeconds = 0;

/// One output channel of a device, as stored in the device subtree.
///
/// Field names are the device wire format. Central invariant: an off relay
/// never carries a pending timer (`!status` implies `timer_off_at == 0`);
/// every write this engine issues preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relay {
    pub name: String,
    /// `true` when the relay is energized.
    pub status: bool,
    /// When the relay last changed state, seconds since epoch.
    #[serde(default)]
    pub last_changed: UnixSeconds,
    /// One-shot deadline after which the relay turns off, or [`NO_TIMER`].
    #[serde(default)]
    pub timer_off_at: UnixSeconds,
}

impl Relay {
    /// A relay that is on with a timer still in the future.
    #[must_use]
    pub fn has_active_timer(&self, now: UnixSeconds) -> bool {
        self.status && self.timer_off_at > now
    }

    /// A timer is due once wall-clock time reaches it. `<=` rather than `<`,
    /// so an exact-boundary expiry fires on the same evaluation.
    #[must_use]
    pub fn timer_due(&self, now: UnixSeconds) -> bool {
        self.status && self.timer_off_at != NO_TIMER && self.timer_off_at <= now
    }

    /// Seconds left on the timer; zero when expired or absent.
    #[must_use]
    pub fn remaining(&self, now: UnixSeconds) -> u64 {
        if self.has_active_timer(now) {
            self.timer_off_at - now
        } else {
            0
        }
    }

    /// Whether the status/timer pairing invariant holds for this relay.
    #[must_use]
    pub fn holds_invariant(&self) -> bool {
        self.status || self.timer_off_at == NO_TIMER
    }
}
