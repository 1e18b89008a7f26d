//! Relay write-set construction.
//!
//! Central invariant: an off relay never carries a pending timer. These are
//! the only constructors of relay field writes in the engine, and the off
//! constructor always pairs `status = false` with `timer_off_at = 0` in the
//! same atomic batch, so the invariant holds by construction.

use serde_json::json;

use relayhub_domain::id::{DeviceId, RelayId};
use relayhub_domain::relay::NO_TIMER;
use relayhub_domain::time::UnixSeconds;

use crate::paths;
use crate::ports::WriteBatch;

/// Turn a relay on. Any pending `timer_off_at` is left untouched; an off
/// relay cannot have one.
pub fn relay_on(batch: &mut WriteBatch, device_id: &DeviceId, relay_id: &RelayId, now: UnixSeconds) {
    batch.set(paths::relay_status(device_id, relay_id), json!(true));
    batch.set(paths::relay_last_changed(device_id, relay_id), json!(now));
}

/// Turn a relay on with a one-shot off deadline. Overwrites any prior timer
/// (last writer wins on `timer_off_at`).
pub fn relay_on_with_timer(
    batch: &mut WriteBatch,
    device_id: &DeviceId,
    relay_id: &RelayId,
    off_at: UnixSeconds,
    now: UnixSeconds,
) {
    batch.set(paths::relay_status(device_id, relay_id), json!(true));
    batch.set(paths::relay_timer_off_at(device_id, relay_id), json!(off_at));
    batch.set(paths::relay_last_changed(device_id, relay_id), json!(now));
}

/// Turn a relay off, always clearing the timer in the same batch.
pub fn relay_off(
    batch: &mut WriteBatch,
    device_id: &DeviceId,
    relay_id: &RelayId,
    now: UnixSeconds,
) {
    batch.set(paths::relay_status(device_id, relay_id), json!(false));
    batch.set(
        paths::relay_timer_off_at(device_id, relay_id),
        json!(NO_TIMER),
    );
    batch.set(paths::relay_last_changed(device_id, relay_id), json!(now));
}
