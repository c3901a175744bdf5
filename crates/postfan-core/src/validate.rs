//! Payload validation for incoming ingestion requests.
//!
//! Turns a raw request body into a validated [`IngestRequest`] or a
//! specific [`ValidationError`]. Gates run in strict order and each is
//! terminal: body shape, endpoint URL, endpoint method, data sequence.
//! This step is pure; the store is never touched while validation can
//! still fail.

use serde_json::Value;
use url::Url;

use crate::{
    error::ValidationError,
    models::{DataRecord, EndpointTemplate, HttpMethod, IngestRequest},
};

/// Parses and validates a raw request body.
///
/// # Errors
///
/// Returns the first failing gate, in order:
/// - [`ValidationError::MalformedBody`] if the body is not a JSON object
/// - [`ValidationError::InvalidEndpointUrl`] if `endpoint.url` is missing
///   or not an absolute URL with a host
/// - [`ValidationError::UnsupportedMethod`] if `endpoint.method` is not
///   GET or POST (case-insensitive)
/// - [`ValidationError::MissingOrInvalidData`] if `data` is missing,
///   empty, or contains a non-object element
pub fn validate_payload(body: &[u8]) -> Result<IngestRequest, ValidationError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|_| ValidationError::MalformedBody)?;
    if !value.is_object() {
        return Err(ValidationError::MalformedBody);
    }

    let url = validate_endpoint_url(&value)?;
    let method = validate_endpoint_method(&value)?;
    let data = validate_data(&value)?;

    Ok(IngestRequest { endpoint: EndpointTemplate { method, url }, data })
}

/// Checks that `endpoint.url` is a well-formed absolute URL.
///
/// The URL is returned verbatim, not in the parser's normalized form, so
/// that `{placeholder}` tokens reach the dispatcher untouched.
fn validate_endpoint_url(value: &Value) -> Result<String, ValidationError> {
    let raw = value.pointer("/endpoint/url").and_then(Value::as_str).unwrap_or("");

    let invalid = || ValidationError::InvalidEndpointUrl { url: raw.to_string() };

    let parsed = Url::parse(raw).map_err(|_| invalid())?;
    if !parsed.has_host() {
        return Err(invalid());
    }

    Ok(raw.to_string())
}

/// Checks that `endpoint.method` uppercases to GET or POST.
fn validate_endpoint_method(value: &Value) -> Result<HttpMethod, ValidationError> {
    let raw = value.pointer("/endpoint/method").and_then(Value::as_str).unwrap_or("");

    HttpMethod::parse(raw)
        .ok_or_else(|| ValidationError::UnsupportedMethod { method: raw.to_string() })
}

/// Checks that `data` is a non-empty array of objects.
///
/// Elements are accepted as opaque beyond the object check; no deeper
/// schema is enforced.
fn validate_data(value: &Value) -> Result<Vec<DataRecord>, ValidationError> {
    let records = value.pointer("/data").and_then(Value::as_array).ok_or_else(|| {
        ValidationError::MissingOrInvalidData {
            reason: "expected \"data\" to be an array".to_string(),
        }
    })?;

    if records.is_empty() {
        return Err(ValidationError::MissingOrInvalidData {
            reason: "\"data\" must not be empty".to_string(),
        });
    }

    records
        .iter()
        .map(|record| {
            record.as_object().cloned().ok_or_else(|| ValidationError::MissingOrInvalidData {
                reason: "every \"data\" element must be an object".to_string(),
            })
        })
        .collect()
}
