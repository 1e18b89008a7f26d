//! # relayhub-domain
//!
//! Pure domain model for the relayhub relay automation engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Relays** (on/off output channels with one-shot off timers)
//! - Define **Device records** (the device subtree as stored remotely)
//! - Define **Schedules** (recurring weekly on/off rules, one per relay)
//! - Define the **Snapshot** (immutable point-in-time join of all of the
//!   above) and the pure reconciliation queries over it
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod device;
pub mod relay;
pub mod schedule;
pub mod snapshot;
