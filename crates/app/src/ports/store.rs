//! Store port — the key-path-addressable shared state store.
//!
//! The store is the only mutable shared resource in the system and it has
//! many concurrent writers (clients, the watchdog, the device firmware).
//! Every write names absolute target values — never read-modify-write — so
//! any interleaving converges under the store's last-writer-wins semantics.

use std::collections::BTreeMap;
use std::future::Future;

use serde_json::Value;

use relayhub_domain::error::HubError;

/// An ordered set of absolute `path → value` assignments.
///
/// A batch is applied atomically: readers never observe some entries applied
/// and others not. The full set of target paths is known before submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    entries: BTreeMap<String, Value>,
}

impl WriteBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` at `path`, replacing any earlier assignment for the
    /// same path within this batch.
    pub fn set(&mut self, path: impl Into<String>, value: Value) {
        self.entries.insert(path.into(), value);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The value assigned at `path`, if any.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a WriteBatch {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Shared state store consumed by the engine.
///
/// Implementations must apply [`write_many`](Self::write_many) atomically
/// across all paths of the batch and must notify subscribers with whole
/// subtree values, never field-by-field deltas.
pub trait StateStore {
    /// Apply every entry of `batch` atomically.
    ///
    /// An empty batch is a no-op success.
    fn write_many(&self, batch: WriteBatch) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Assign `value` at a single path.
    fn write_one(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), HubError>> + Send;

    /// Insert `value` under `collection` with a store-generated key, and
    /// return that key.
    fn create_child(
        &self,
        collection: &str,
        value: Value,
    ) -> impl Future<Output = Result<String, HubError>> + Send;

    /// Remove the node at `path`. Deleting an absent node succeeds.
    fn delete(&self, path: &str) -> impl Future<Output = Result<(), HubError>> + Send;
}

impl<T: StateStore + Send + Sync> StateStore for std::sync::Arc<T> {
    fn write_many(&self, batch: WriteBatch) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).write_many(batch)
    }

    fn write_one(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).write_one(path, value)
    }

    fn create_child(
        &self,
        collection: &str,
        value: Value,
    ) -> impl Future<Output = Result<String, HubError>> + Send {
        (**self).create_child(collection, value)
    }

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), HubError>> + Send {
        (**self).delete(path)
    }
}
