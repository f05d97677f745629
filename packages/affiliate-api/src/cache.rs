//! Query-side response cache with in-flight deduplication.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use crate::error::Result;

/// Cache for one query operation, keyed by serialized arguments.
///
/// Each entry is a `OnceCell`: the first caller for a key runs the fetch,
/// callers arriving while it is in flight wait on the same cell and observe
/// the identical outcome, and later callers replay the stored outcome without
/// touching the transport. Failed outcomes are kept too; `invalidate` is the
/// way to retry.
pub(crate) struct QueryCache<T> {
    entries: Mutex<HashMap<String, Arc<OnceCell<Result<T>>>>>,
}

impl<T: Clone> QueryCache<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the outcome for `key`, running `fetch` only when nothing is
    /// stored and no identical request is in flight.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.to_string()).or_default().clone()
        };
        cell.get_or_init(fetch).await.clone()
    }

    /// Drop the stored outcome for `key`; the next query refetches. Callers
    /// already waiting on the old entry still resolve against it.
    pub async fn invalidate(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}
