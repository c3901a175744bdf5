//! HTTP request handlers for the postfan API.
//!
//! Handlers follow a consistent pattern:
//! - Input validation with stable error codes before any side effect
//! - Tracing spans for observability
//! - Standardized JSON error responses
//!
//! `ingest` drives the fan-out pipeline; `health` serves the liveness,
//! readiness, and health probes.

pub mod health;
pub mod ingest;

pub use health::{health_check, liveness_check, readiness_check};
pub use ingest::ingest_postbacks;
