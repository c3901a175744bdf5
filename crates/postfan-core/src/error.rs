//! Error types for payload validation.
//!
//! Defines the client-input error taxonomy with stable codes for caller
//! disambiguation. Every variant is terminal: a validation failure is
//! reported before any side effect reaches the store.

use thiserror::Error;

/// Validation failure for an incoming ingestion payload.
///
/// Variants mirror the validation gates in order: body shape, endpoint
/// URL, endpoint method, data sequence. The first failing gate wins;
/// later gates are never evaluated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Request body is not a JSON object (E1001).
    #[error("[E1001] Malformed body: raw request is not a JSON object")]
    MalformedBody,

    /// Endpoint URL is missing or not an absolute URL (E1002).
    #[error("[E1002] Invalid endpoint url: {url:?} is not an absolute URL")]
    InvalidEndpointUrl {
        /// The URL value as received, empty if absent.
        url: String,
    },

    /// Endpoint method is not GET or POST (E1003).
    #[error("[E1003] Unsupported method: expected GET or POST, got {method:?}")]
    UnsupportedMethod {
        /// The method value as received, empty if absent.
        method: String,
    },

    /// Data sequence is missing, empty, or contains non-object elements (E1004).
    #[error("[E1004] Missing or invalid data: {reason}")]
    MissingOrInvalidData {
        /// Which structural check on `data` failed.
        reason: String,
    },
}

impl ValidationError {
    /// Returns the stable error code (E1001-E1004).
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MalformedBody => "E1001",
            Self::InvalidEndpointUrl { .. } => "E1002",
            Self::UnsupportedMethod { .. } => "E1003",
            Self::MissingOrInvalidData { .. } => "E1004",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(ValidationError::MalformedBody.code(), "E1001");
        assert_eq!(ValidationError::InvalidEndpointUrl { url: String::new() }.code(), "E1002");
        assert_eq!(ValidationError::UnsupportedMethod { method: String::new() }.code(), "E1003");
        assert_eq!(
            ValidationError::MissingOrInvalidData { reason: String::new() }.code(),
            "E1004"
        );
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = ValidationError::UnsupportedMethod { method: "DELETE".to_string() };
        assert!(err.to_string().contains("DELETE"));

        let err = ValidationError::InvalidEndpointUrl { url: "not a url".to_string() };
        assert!(err.to_string().contains("not a url"));
    }
}
