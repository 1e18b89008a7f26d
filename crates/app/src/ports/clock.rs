//! Clock port — wall-clock time as whole seconds since the epoch.
//!
//! Timer arithmetic goes through this trait so the watchdog and the command
//! authority can be driven with a deterministic clock in tests.

use relayhub_domain::time::{self, UnixSeconds};

/// Source of the current wall-clock time.
pub trait Clock {
    fn now(&self) -> UnixSeconds;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UnixSeconds {
        time::now()
    }
}

impl<T: Clock> Clock for std::sync::Arc<T> {
    fn now(&self) -> UnixSeconds {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_track_the_system_clock() {
        let before = time::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
