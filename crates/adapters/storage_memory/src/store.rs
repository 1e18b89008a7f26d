//! The in-process state store.
//!
//! One mutex guards the whole tree and the subscription list, so a batch is
//! applied and its notifications queued as a single critical section.
//! Subscribers therefore observe batches whole and in a consistent order.

use std::future::{Future, ready};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::debug;

use relayhub_app::ports::{StateStore, WriteBatch};
use relayhub_domain::error::HubError;

use crate::tree;

/// Notifications buffered per subscriber before slow ones start lagging.
const CHANNEL_CAPACITY: usize = 64;

/// Key-path-addressable JSON tree with subtree subscriptions.
///
/// Writes are last-writer-wins: every assignment names an absolute target
/// value, and the store keeps whichever was applied last. Subscribers get
/// the full current value of their subtree after each overlapping write,
/// never a field-level delta.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    root: Value,
    subscriptions: Vec<Subscription>,
}

#[derive(Debug)]
struct Subscription {
    path: String,
    tx: broadcast::Sender<Value>,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            root: Value::Object(Map::new()),
            subscriptions: Vec::new(),
        }
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the subtree at `path`.
    ///
    /// The current value of the subtree ([`Value::Null`] when the node does
    /// not exist) is delivered immediately, then the whole subtree again
    /// after every write that overlaps it. A lagging receiver loses the
    /// oldest buffered values, never the most recent one.
    pub fn subscribe(&self, path: &str) -> broadcast::Receiver<Value> {
        let mut inner = self.lock();
        let (tx, rx) = broadcast::channel(CHANNEL_CAPACITY);
        let current = subtree(&inner.root, path);
        // Delivery cannot fail: `rx` is alive and attached.
        let _ = tx.send(current);
        inner.subscriptions.push(Subscription {
            path: path.to_string(),
            tx,
        });
        rx
    }

    /// The current value at `path`, [`Value::Null`] when absent.
    #[must_use]
    pub fn read(&self, path: &str) -> Value {
        subtree(&self.lock().root, path)
    }

    fn apply(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        let mut inner = self.lock();
        let mut touched: Vec<String> = Vec::new();
        for (path, value) in entries {
            tree::set(&mut inner.root, &path, value);
            touched.push(path);
        }
        if touched.is_empty() {
            return;
        }
        debug!(paths = touched.len(), "applied write batch");
        for subscription in &inner.subscriptions {
            if touched
                .iter()
                .any(|path| overlaps(path, &subscription.path))
            {
                // Receivers may all be gone; that only means nobody listens.
                let _ = subscription
                    .tx
                    .send(subtree(&inner.root, &subscription.path));
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateStore for MemoryStore {
    fn write_many(&self, batch: WriteBatch) -> impl Future<Output = Result<(), HubError>> + Send {
        self.apply(batch);
        ready(Ok(()))
    }

    fn write_one(
        &self,
        path: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), HubError>> + Send {
        self.apply([(path.to_string(), value)]);
        ready(Ok(()))
    }

    fn create_child(
        &self,
        collection: &str,
        value: Value,
    ) -> impl Future<Output = Result<String, HubError>> + Send {
        let key = uuid::Uuid::new_v4().simple().to_string();
        self.apply([(format!("{collection}/{key}"), value)]);
        ready(Ok(key))
    }

    fn delete(&self, path: &str) -> impl Future<Output = Result<(), HubError>> + Send {
        self.apply([(path.to_string(), Value::Null)]);
        ready(Ok(()))
    }
}

fn subtree(root: &Value, path: &str) -> Value {
    tree::get(root, path).cloned().unwrap_or(Value::Null)
}

/// Whether a write at `written` can change the subtree rooted at
/// `subscribed`. True when either path is a segment-wise prefix of the
/// other: a write inside the subtree changes it, and a write above it can
/// replace it wholesale.
fn overlaps(written: &str, subscribed: &str) -> bool {
    let mut a = tree::segments(written);
    let mut b = tree::segments(subscribed);
    loop {
        match (a.next(), b.next()) {
            (Some(left), Some(right)) if left == right => {}
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}
