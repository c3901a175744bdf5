//! Postfan HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::Arc;

use postfan_store::Enqueuer;

pub mod config;
pub mod handlers;
pub mod server;

pub use config::Config;
pub use server::{create_router, create_router_with_timeout, start_server};

/// Shared application state for all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Scheme-aware writer over the durable store.
    pub enqueuer: Arc<Enqueuer>,
}

impl AppState {
    /// Creates state around an enqueuer.
    pub fn new(enqueuer: Arc<Enqueuer>) -> Self {
        Self { enqueuer }
    }
}
