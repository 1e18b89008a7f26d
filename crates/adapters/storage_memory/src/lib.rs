//! # relayhub-adapter-storage-memory
//!
//! In-process implementation of the shared state store.
//!
//! ## Responsibilities
//! - Hold the whole device and schedule state as one JSON tree addressed by
//!   `/`-separated key paths
//! - Implement the [`StateStore`](relayhub_app::ports::StateStore) port:
//!   atomic multi-path writes, single writes, keyed child creation, deletes
//! - Notify subtree subscribers with the absolute value of their subtree
//!   after every overlapping write
//!
//! ## Dependency rule
//! Depends on `relayhub-app` (for the port trait) and `relayhub-domain`.
//! The `app` and `domain` crates must never reference this adapter.

pub mod store;
pub mod tree;

pub use store::MemoryStore;
