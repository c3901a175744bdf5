//! Postback ingestion handler.
//!
//! Drives the pipeline end-to-end for one request: validate the payload,
//! probe the store, then attempt every record in input order. Validation
//! failures and an unreachable store are terminal before any write; a
//! per-record write failure never aborts the batch, it is aggregated and
//! surfaced as a partial-failure outcome so the caller can resubmit just
//! the failed subset.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use postfan_core::{validate_payload, ValidationError};
use postfan_store::StoreError;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};

use crate::AppState;

/// Response from an ingestion request that reached the enqueue stage.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Number of postback units durably written.
    pub enqueued: usize,
    /// Records that failed to enqueue, empty on full success.
    pub failed_records: Vec<FailedRecord>,
}

/// One record that could not be enqueued.
#[derive(Debug, Serialize)]
pub struct FailedRecord {
    /// Zero-based position of the record in the submitted `data` array.
    pub index: usize,
    /// Stable store-error message for this record.
    pub error: String,
}

/// Error response with code and message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error details including code and message.
    pub error: ErrorDetail,
}

/// Detailed error information.
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code from the taxonomy (E1001-E3004).
    pub code: String,
    /// Human-readable error description.
    pub message: String,
}

/// Ingests one endpoint template plus data records and fans them out
/// into durable postback units.
///
/// # Errors
///
/// Returns distinguishable HTTP status codes:
/// - 400: payload rejected by validation, nothing written
/// - 503: store unreachable before the first write, nothing written
/// - 207: some records written, the rest reported by index
/// - 200: every record written
#[instrument(name = "ingest_postbacks", skip(state, body), fields(body_len = body.len()))]
pub async fn ingest_postbacks(State(state): State<AppState>, body: Bytes) -> Response {
    info!("Processing postback ingestion request");

    let request = match validate_payload(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(code = e.code(), error = %e, "Payload rejected");
            return validation_error_response(&e);
        },
    };

    debug!(
        method = %request.endpoint.method,
        url = %request.endpoint.url,
        records = request.data.len(),
        "Payload validated"
    );

    if let Err(e) = state.enqueuer.ping().await {
        error!(error = %e, "Store unreachable, rejecting before any write");
        return store_error_response(StatusCode::SERVICE_UNAVAILABLE, &e);
    }

    let mut enqueued = 0usize;
    let mut failed_records = Vec::new();

    for (index, unit) in request.fan_out().enumerate() {
        match state.enqueuer.enqueue(&unit).await {
            Ok(placed) => {
                debug!(index, placed = ?placed, "Postback enqueued");
                enqueued += 1;
            },
            Err(e) => {
                warn!(index, error = %e, "Record enqueue failed, continuing with remaining records");
                failed_records.push(FailedRecord { index, error: e.to_string() });
            },
        }
    }

    let response = IngestResponse { enqueued, failed_records };
    if response.failed_records.is_empty() {
        info!(enqueued, "All postbacks enqueued");
        (StatusCode::OK, Json(response)).into_response()
    } else {
        warn!(
            enqueued,
            failed = response.failed_records.len(),
            "Partial fan-out, reporting failed record indices"
        );
        (StatusCode::MULTI_STATUS, Json(response)).into_response()
    }
}

/// Builds the 400 response for a rejected payload.
fn validation_error_response(error: &ValidationError) -> Response {
    let body = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

/// Builds an error response from a store failure.
fn store_error_response(status: StatusCode, error: &StoreError) -> Response {
    let body = ErrorResponse {
        error: ErrorDetail { code: error.code().to_string(), message: error.to_string() },
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response = validation_error_response(&ValidationError::MalformedBody);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = validation_error_response(&ValidationError::UnsupportedMethod {
            method: "DELETE".to_string(),
        });
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn store_errors_keep_their_code() {
        let error = StoreError::Unavailable { message: "refused".to_string() };
        let response = store_error_response(StatusCode::SERVICE_UNAVAILABLE, &error);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.code(), "E3001");
    }
}
