//! # relayhub-app
//!
//! Application layer — the reconciliation engine and its **port definitions**.
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound):
//!   - `StateStore` — key-path-addressable shared store with atomic
//!     multi-path writes
//!   - `Clock` — wall-clock seconds, injectable for deterministic tests
//! - Provide the engine's use-cases (driving/inbound surface):
//!   - `SnapshotModel` — folds store notifications into published snapshots
//!   - `RelayCommands` — validates and issues every user-initiated write
//!   - `ScheduleService` — CRUD over schedule records
//!   - `TimerWatchdog` — fires the compensating write when timers expire
//! - Orchestrate domain objects without knowing *how* the store persists or
//!   replicates
//!
//! ## Dependency rule
//! Depends on `relayhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod commands;
pub mod paths;
pub mod ports;
pub mod schedules;
pub mod snapshot_model;
pub mod watchdog;
pub mod writes;
