//! Redis implementation of the enqueue store.
//!
//! Maps the store contract onto Redis primitives: RPUSH for ordered-list
//! appends, INCR for atomic counter allocation, HSET for field writes
//! under composite keys. Every call is bounded by the configured
//! operation timeout so no request blocks indefinitely on a dead store.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use tracing::{debug, instrument};

use ::redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client, RedisResult,
};

use crate::{
    error::{StoreError, StoreResult},
    traits::EnqueueStore,
};

/// Redis-backed [`EnqueueStore`].
///
/// Holds a multiplexed connection manager that is cheap to clone and safe
/// for concurrent use by simultaneous requests; the manager reconnects
/// transparently after transport failures.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    /// Connects to Redis and verifies the connection with a ping.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL is invalid or the
    /// server cannot be reached, [`StoreError::Timeout`] if the initial
    /// connection exceeds `connect_timeout`.
    pub async fn connect(
        url: &str,
        connect_timeout: Duration,
        op_timeout: Duration,
    ) -> StoreResult<Self> {
        let client = Client::open(url)
            .map_err(|e| StoreError::Unavailable { message: e.to_string() })?;

        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(connect_timeout)
            .set_response_timeout(op_timeout);

        let conn = tokio::time::timeout(connect_timeout, ConnectionManager::new_with_config(client, config))
            .await
            .map_err(|_| StoreError::Timeout { timeout_ms: as_millis(connect_timeout) })?
            .map_err(StoreError::from)?;

        let store = Self { conn, op_timeout };
        store.ping().await?;

        debug!("Redis connection established");
        Ok(store)
    }

    /// Bounds a store call by the operation timeout.
    async fn bounded<T, F>(&self, fut: F) -> StoreResult<T>
    where
        F: Future<Output = RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout { timeout_ms: as_millis(self.op_timeout) }),
        }
    }
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl EnqueueStore for RedisStore {
    #[instrument(name = "redis_ping", skip(self))]
    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { ::redis::cmd("PING").query_async(&mut conn).await }).await
    }

    #[instrument(name = "redis_append_list", skip(self, payload))]
    async fn append_list(&self, list: &str, payload: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.rpush(list, payload).await }).await
    }

    #[instrument(name = "redis_incr_counter", skip(self))]
    async fn incr_counter(&self, counter: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.incr(counter, 1u64).await }).await
    }

    #[instrument(name = "redis_put_fields", skip(self, fields))]
    async fn put_fields(&self, key: &str, fields: &[(&str, String)]) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        self.bounded(async move { conn.hset_multiple(key, fields).await }).await
    }
}
