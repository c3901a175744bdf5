//! Scheme-dispatching enqueue logic.
//!
//! The [`Enqueuer`] owns the deployment-time addressing choice and turns
//! each postback unit into the store writes that scheme requires. The two
//! schemes are mutually exclusive persistent contracts: once a dispatcher
//! consumes one of them, switching silently would strand enqueued units,
//! so the scheme is fixed by configuration and never chosen per request.

use std::sync::Arc;

use postfan_core::PostbackUnit;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{StoreError, StoreResult},
    traits::EnqueueStore,
};

/// Durable addressing scheme for enqueued postback units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageScheme {
    /// Append each serialized unit to the tail of one named list;
    /// readers consume in FIFO order. One write per unit.
    ListAppend,
    /// Allocate a strictly increasing id from the shared tail counter
    /// and write the unit under `prefix:<id>` as `endpoint` and `data`
    /// fields. Two store calls per unit.
    CounterAddressed,
}

/// Key names and scheme choice for the enqueue path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueConfig {
    /// Which addressing scheme the deployment uses.
    pub scheme: StorageScheme,
    /// List key for the list-append scheme.
    pub list_key: String,
    /// Counter key holding the postback tail for the counter scheme.
    pub counter_key: String,
    /// Key prefix for counter-addressed records.
    pub record_key_prefix: String,
}

impl Default for EnqueueConfig {
    fn default() -> Self {
        Self {
            scheme: StorageScheme::ListAppend,
            list_key: "request".to_string(),
            counter_key: "postback_tail".to_string(),
            record_key_prefix: "postback".to_string(),
        }
    }
}

/// Where a successfully enqueued unit landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueuedRef {
    /// Appended to the tail of the configured list.
    ListTail,
    /// Written under the counter-allocated record id.
    RecordId(u64),
}

/// Writes postback units into the store under the configured scheme.
pub struct Enqueuer {
    store: Arc<dyn EnqueueStore>,
    config: EnqueueConfig,
}

impl Enqueuer {
    /// Creates an enqueuer over the given store and configuration.
    pub fn new(store: Arc<dyn EnqueueStore>, config: EnqueueConfig) -> Self {
        Self { store, config }
    }

    /// The active enqueue configuration.
    pub fn config(&self) -> &EnqueueConfig {
        &self.config
    }

    /// Probes store connectivity without writing anything.
    ///
    /// The request handler calls this after validation and before the
    /// first write, so a dead store is terminal for the whole request
    /// rather than a string of per-record failures.
    pub async fn ping(&self) -> StoreResult<()> {
        self.store.ping().await
    }

    /// Durably writes one postback unit.
    ///
    /// # Errors
    ///
    /// Returns the store failure for this unit only; the caller decides
    /// whether to continue with the remaining records.
    pub async fn enqueue(&self, unit: &PostbackUnit<'_>) -> StoreResult<EnqueuedRef> {
        match self.config.scheme {
            StorageScheme::ListAppend => {
                let payload = serialize(unit)?;
                self.store.append_list(&self.config.list_key, &payload).await?;
                debug!(list = %self.config.list_key, "postback appended");
                Ok(EnqueuedRef::ListTail)
            },
            StorageScheme::CounterAddressed => {
                let endpoint = serialize(unit.endpoint)?;
                let data = serialize(unit.data)?;

                let id = self.store.incr_counter(&self.config.counter_key).await?;
                let key = format!("{}:{id}", self.config.record_key_prefix);

                // Both sub-fields land in one store call, so another
                // record's allocation can never interleave between them.
                self.store
                    .put_fields(&key, &[("endpoint", endpoint), ("data", data)])
                    .await?;
                debug!(%key, "postback written");
                Ok(EnqueuedRef::RecordId(id))
            },
        }
    }
}

fn serialize<T: Serialize>(value: &T) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|e| StoreError::Serialization { message: e.to_string() })
}
