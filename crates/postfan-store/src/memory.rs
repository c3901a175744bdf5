//! In-memory store implementation for testing.
//!
//! Deterministic stand-in for the Redis backend with the same observable
//! contract: ordered list appends, atomic counter increments, and field
//! writes under composite keys. Supports failure injection so tests can
//! exercise the unavailable-store and partial-fan-out paths without a
//! real store.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;

use crate::{
    error::{StoreError, StoreResult},
    traits::EnqueueStore,
};

#[derive(Debug, Default)]
struct MemoryState {
    lists: HashMap<String, Vec<String>>,
    counters: HashMap<String, u64>,
    records: HashMap<String, HashMap<String, String>>,
}

/// In-memory implementation of [`EnqueueStore`].
///
/// All operations take the single state lock, so the counter increment is
/// observably atomic under concurrent load, matching the store-level
/// atomicity the Redis backend provides.
#[derive(Debug)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    unavailable: AtomicBool,
    write_budget: AtomicI64,
    writes: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            unavailable: AtomicBool::new(false),
            write_budget: AtomicI64::new(i64::MAX),
            writes: AtomicUsize::new(0),
        }
    }
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in `Arc`.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Marks the store unreachable; every operation fails with
    /// [`StoreError::Unavailable`] until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Allows `budget` more write operations, after which every write
    /// fails with [`StoreError::WriteFailed`]. Pings are not counted.
    ///
    /// Note the counter-addressed scheme costs two write operations per
    /// record (increment plus field write).
    pub fn fail_after_writes(&self, budget: u64) {
        self.write_budget.store(i64::try_from(budget).unwrap_or(i64::MAX), Ordering::SeqCst);
    }

    /// Number of write operations that have succeeded.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Contents of the named list, in append order.
    pub fn list(&self, list: &str) -> Vec<String> {
        let state = self.state.lock().expect("memory store lock poisoned");
        state.lists.get(list).cloned().unwrap_or_default()
    }

    /// Current value of the named counter, zero if never incremented.
    pub fn counter(&self, counter: &str) -> u64 {
        let state = self.state.lock().expect("memory store lock poisoned");
        state.counters.get(counter).copied().unwrap_or(0)
    }

    /// Fields stored under a composite key, if the key exists.
    pub fn record_fields(&self, key: &str) -> Option<HashMap<String, String>> {
        let state = self.state.lock().expect("memory store lock poisoned");
        state.records.get(key).cloned()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "in-memory store marked unavailable".to_string(),
            });
        }
        Ok(())
    }

    fn consume_write(&self) -> StoreResult<()> {
        self.check_available()?;
        if self.write_budget.fetch_sub(1, Ordering::SeqCst) <= 0 {
            return Err(StoreError::WriteFailed {
                message: "injected write failure: budget exhausted".to_string(),
            });
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl EnqueueStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn append_list(&self, list: &str, payload: &str) -> StoreResult<()> {
        self.consume_write()?;
        let mut state = self.state.lock().expect("memory store lock poisoned");
        state.lists.entry(list.to_string()).or_default().push(payload.to_string());
        Ok(())
    }

    async fn incr_counter(&self, counter: &str) -> StoreResult<u64> {
        self.consume_write()?;
        let mut state = self.state.lock().expect("memory store lock poisoned");
        let value = state.counters.entry(counter.to_string()).or_insert(0);
        *value += 1;
        Ok(*value)
    }

    async fn put_fields(&self, key: &str, fields: &[(&str, String)]) -> StoreResult<()> {
        self.consume_write()?;
        let mut state = self.state.lock().expect("memory store lock poisoned");
        let record = state.records.entry(key.to_string()).or_default();
        for (field, value) in fields {
            record.insert((*field).to_string(), value.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_preserve_order() {
        let store = MemoryStore::new();

        store.append_list("request", "first").await.unwrap();
        store.append_list("request", "second").await.unwrap();

        assert_eq!(store.list("request"), vec!["first".to_string(), "second".to_string()]);
    }

    #[tokio::test]
    async fn counter_starts_at_one_and_is_monotonic() {
        let store = MemoryStore::new();

        assert_eq!(store.incr_counter("postback_tail").await.unwrap(), 1);
        assert_eq!(store.incr_counter("postback_tail").await.unwrap(), 2);
        assert_eq!(store.counter("postback_tail"), 2);
    }

    #[tokio::test]
    async fn concurrent_increments_never_collide() {
        let store = MemoryStore::new_shared();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut ids = Vec::new();
                for _ in 0..25 {
                    ids.push(store.incr_counter("postback_tail").await.unwrap());
                }
                ids
            }));
        }

        let mut all_ids = Vec::new();
        for handle in handles {
            all_ids.extend(handle.await.unwrap());
        }

        all_ids.sort_unstable();
        let expected: Vec<u64> = (1..=400).collect();
        assert_eq!(all_ids, expected);
    }

    #[tokio::test]
    async fn unavailable_store_rejects_everything() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        assert!(matches!(store.ping().await, Err(StoreError::Unavailable { .. })));
        assert!(matches!(
            store.append_list("request", "x").await,
            Err(StoreError::Unavailable { .. })
        ));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn write_budget_exhaustion_fails_later_writes() {
        let store = MemoryStore::new();
        store.fail_after_writes(1);

        store.append_list("request", "ok").await.unwrap();
        assert!(matches!(
            store.append_list("request", "rejected").await,
            Err(StoreError::WriteFailed { .. })
        ));

        // Pings stay healthy; only writes consume the budget.
        store.ping().await.unwrap();
        assert_eq!(store.list("request"), vec!["ok".to_string()]);
    }
}
