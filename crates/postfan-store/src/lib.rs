//! Durable enqueue store abstraction and backends.
//!
//! Defines the [`EnqueueStore`] trait over the three store capabilities
//! the pipeline needs (list append, atomic counter increment, field write
//! under a composite key), a Redis production backend, an in-memory
//! backend for deterministic tests, and the [`Enqueuer`] that applies the
//! deployment-time addressing scheme to each postback unit.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod enqueue;
pub mod error;
pub mod memory;
pub mod redis;
pub mod traits;

pub use self::redis::RedisStore;
pub use enqueue::{EnqueueConfig, EnqueuedRef, Enqueuer, StorageScheme};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use traits::EnqueueStore;
