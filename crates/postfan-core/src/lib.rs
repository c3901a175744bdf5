//! Core domain models, validation, and fan-out encoding.
//!
//! Provides the typed representation of an ingestion request — an endpoint
//! template plus its opaque data records — along with the payload validator
//! that gates every request before any store contact, and the fan-out
//! encoder that pairs the template with each record. The other crates
//! depend on these foundational types for type safety and consistency.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod models;
pub mod validate;

pub use error::ValidationError;
pub use models::{DataRecord, EndpointTemplate, HttpMethod, IngestRequest, PostbackUnit};
pub use validate::validate_payload;
