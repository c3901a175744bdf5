//! EnqueueStore trait definition.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Abstract interface over the durable external store.
///
/// Covers exactly the capabilities the enqueue path needs: connectivity
/// probing, tail-append to a named ordered collection, atomic counter
/// increment, and field writes under a composite key. No reads are part
/// of the contract; consuming enqueued units is the dispatcher's job.
///
/// Implementations must be thread-safe (`Send + Sync`) and safe for
/// concurrent use by simultaneous requests.
#[async_trait]
pub trait EnqueueStore: Send + Sync + 'static {
    /// Probes store connectivity without writing anything.
    async fn ping(&self) -> StoreResult<()>;

    /// Appends a serialized payload to the tail of the named list.
    async fn append_list(&self, list: &str, payload: &str) -> StoreResult<()>;

    /// Atomically increments the named counter, returning the new value.
    ///
    /// The increment must be atomic at the store level; concurrent
    /// callers never observe the same value twice.
    async fn incr_counter(&self, counter: &str) -> StoreResult<u64>;

    /// Writes the given fields under a composite key in one call.
    async fn put_fields(&self, key: &str, fields: &[(&str, String)]) -> StoreResult<()>;
}
