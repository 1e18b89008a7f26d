//! Store path scheme.
//!
//! The store is addressed by `/`-separated key paths. Device records live
//! under `home_automation/devices/{device_id}`; schedule records under
//! `schedules/{schedule_id}`. The two roots are independent aggregates with
//! independent subscriptions.

use relayhub_domain::id::{DeviceId, RelayId, ScheduleId};

/// Root of the schedules collection.
pub const SCHEDULES_ROOT: &str = "schedules";

/// Path of a whole device record.
#[must_use]
pub fn device(device_id: &DeviceId) -> String {
    format!("home_automation/devices/{device_id}")
}

/// Path of the device-maintained liveness flag.
#[must_use]
pub fn device_online(device_id: &DeviceId) -> String {
    format!("{}/online", device(device_id))
}

/// Path of the device-maintained heartbeat timestamp.
#[must_use]
pub fn device_last_update(device_id: &DeviceId) -> String {
    format!("{}/last_update", device(device_id))
}

/// Path of a whole relay record.
#[must_use]
pub fn relay(device_id: &DeviceId, relay_id: &RelayId) -> String {
    format!("{}/relays/{relay_id}", device(device_id))
}

/// Path of a relay's `status` field.
#[must_use]
pub fn relay_status(device_id: &DeviceId, relay_id: &RelayId) -> String {
    format!("{}/status", relay(device_id, relay_id))
}

/// Path of a relay's `last_changed` field.
#[must_use]
pub fn relay_last_changed(device_id: &DeviceId, relay_id: &RelayId) -> String {
    format!("{}/last_changed", relay(device_id, relay_id))
}

/// Path of a relay's `timer_off_at` field.
#[must_use]
pub fn relay_timer_off_at(device_id: &DeviceId, relay_id: &RelayId) -> String {
    format!("{}/timer_off_at", relay(device_id, relay_id))
}

/// Path of a schedule record.
#[must_use]
pub fn schedule(schedule_id: &ScheduleId) -> String {
    format!("{SCHEDULES_ROOT}/{schedule_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_device_and_relay_paths() {
        let device_id = DeviceId::from("pico_w_001");
        let relay_id = RelayId::from("relay_1");
        assert_eq!(device(&device_id), "home_automation/devices/pico_w_001");
        assert_eq!(
            relay_status(&device_id, &relay_id),
            "home_automation/devices/pico_w_001/relays/relay_1/status"
        );
        assert_eq!(
            relay_timer_off_at(&device_id, &relay_id),
            "home_automation/devices/pico_w_001/relays/relay_1/timer_off_at"
        );
        assert_eq!(
            device_online(&device_id),
            "home_automation/devices/pico_w_001/online"
        );
    }

    #[test]
    fn should_build_schedule_paths() {
        assert_eq!(
            schedule(&ScheduleId::from("abc123")),
            "schedules/abc123"
        );
    }
}
