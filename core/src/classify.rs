//! Maps an HTTP status and JSON body to success or a typed failure.

use serde_json::Value;

use crate::error::{ApiError, ApiErrorKind};
use crate::http::HttpResponse;

/// Parse a response body into a generic JSON document.
///
/// An empty (or whitespace-only) body becomes an empty object so that a
/// failing status without a payload still classifies as an unknown error.
pub fn parse_document(body: &str) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Classify a response against an endpoint's ordered handler list.
///
/// 2xx passes through; anything else is mapped by the `error-type` field.
pub fn classify(handlers: &[ApiErrorKind], status: u16, body: &Value) -> Result<(), ApiError> {
    if is_success(status) {
        return Ok(());
    }
    Err(classify_error(handlers, status, body))
}

/// Map a failing response to an error, first matching handler wins.
pub fn classify_error(handlers: &[ApiErrorKind], status: u16, body: &Value) -> ApiError {
    let Some(error_type) = body.get("error-type").and_then(Value::as_str) else {
        return ApiError::UnknownError { status };
    };
    handlers
        .iter()
        .find(|kind| kind.error_type() == error_type)
        .map(|kind| ApiError::Api(*kind))
        .unwrap_or_else(|| ApiError::UnexpectedErrorType(error_type.to_string()))
}

/// Parse and classify in one step; a non-JSON body on a failing status is
/// treated as a missing `error-type`.
pub fn check_response(handlers: &[ApiErrorKind], response: &HttpResponse) -> Result<Value, ApiError> {
    let document = match parse_document(&response.body) {
        Ok(document) => document,
        Err(_) if !is_success(response.status) => Value::Object(Default::default()),
        Err(e) => return Err(e),
    };
    classify(handlers, response.status, &document)?;
    Ok(document)
}
