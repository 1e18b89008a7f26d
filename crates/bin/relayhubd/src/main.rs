//! # relayhubd — relay hub daemon
//!
//! Composition root that wires the engine together and runs it.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the in-process state store and seed the device record
//! - Subscribe to the device and schedules subtrees
//! - Spawn the snapshot model and the timer watchdog
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use relayhub_adapter_storage_memory::MemoryStore;
use relayhub_app::paths;
use relayhub_app::ports::{Clock, StateStore, SystemClock, WriteBatch};
use relayhub_app::snapshot_model::SnapshotModel;
use relayhub_app::watchdog::TimerWatchdog;
use relayhub_domain::error::HubError;
use relayhub_domain::id::{DeviceId, RelayId};
use relayhub_domain::relay::NO_TIMER;

mod config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    let store = Arc::new(MemoryStore::new());
    let device_id = DeviceId::from(config.device.id.clone());

    // Subscribe before seeding so the first published snapshot already
    // reflects the seeded device record.
    let device_rx = store.subscribe(&paths::device(&device_id));
    let schedules_rx = store.subscribe(paths::SCHEDULES_ROOT);

    seed_device(store.as_ref(), &device_id, &config.device.relays).await?;

    let (model, snapshots) = SnapshotModel::new(device_rx, schedules_rx, SystemClock);
    let model_task = tokio::spawn(model.run());

    let watchdog = TimerWatchdog::new(
        Arc::clone(&store),
        SystemClock,
        device_id.clone(),
        snapshots,
    );
    let watchdog_task = tokio::spawn(watchdog.run());

    info!(device = %device_id, relays = config.device.relays.len(), "relayhubd running");
    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    watchdog_task.abort();
    model_task.abort();
    Ok(())
}

/// Mark the device online and seed any configured relay that has no record
/// yet, off and without a timer. Existing relay records are left untouched
/// so a restart never claws back live state.
async fn seed_device(
    store: &MemoryStore,
    device_id: &DeviceId,
    relays: &[config::RelaySeed],
) -> Result<(), HubError> {
    let now = SystemClock.now();
    let mut batch = WriteBatch::new();
    batch.set(paths::device_online(device_id), json!(true));
    batch.set(paths::device_last_update(device_id), json!(now));
    for seed in relays {
        let relay_id = RelayId::from(seed.id.as_str());
        if store.read(&paths::relay(device_id, &relay_id)).is_null() {
            batch.set(
                paths::relay(device_id, &relay_id),
                json!({
                    "name": seed.name,
                    "status": false,
                    "last_changed": now,
                    "timer_off_at": NO_TIMER,
                }),
            );
        }
    }
    store.write_many(batch).await
}
