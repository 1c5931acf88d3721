use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::json;

use stockroom_core::DomainError;
use stockroom_infra::{StoreError, StoreResult};

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Domain(err) => domain_error_to_response(err),
        StoreError::Serialization(e) => {
            tracing::error!("failed to serialize events: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "serialization_error", e.to_string())
        }
        StoreError::Poisoned => {
            tracing::error!("store lock poisoned");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "store unavailable")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Serialize a store result with `status`, or map its error.
pub fn respond<T: Serialize>(status: StatusCode, result: StoreResult<T>) -> axum::response::Response {
    match result {
        Ok(value) => (status, axum::Json(value)).into_response(),
        Err(e) => store_error_to_response(e),
    }
}

/// Parse a path id, answering 400 when it is malformed.
pub fn parse_id<T>(raw: &str, what: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr,
{
    raw.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", format!("invalid {what} id")))
}
