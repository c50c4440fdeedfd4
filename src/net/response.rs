//! Response classification.
//!
//! Every raw response becomes exactly one outcome: a JSON payload, the
//! distinct `Unauthorized` signal, or `RequestFailed` with a readable message.
//!
//! ERROR BODIES
//! ============
//! Messages are extracted in two stages. Stage one reads a structured JSON
//! body (`detail`, then `message`, then the body itself). Stage two applies
//! when the body is not JSON: plain-text bodies are used verbatim, anything
//! else yields `HTTP <status>: <statusText>`.

#[cfg(test)]
#[path = "response_test.rs"]
mod response_test;

use serde_json::Value;

use super::error::ApiError;
use super::transport::HttpResponse;

pub const UNAUTHORIZED_STATUS: u16 = 401;
pub const NO_CONTENT_STATUS: u16 = 204;

/// Classify a raw response into a payload or an [`ApiError`].
///
/// A 204 resolves to `true` without touching the body.
///
/// # Errors
///
/// - [`ApiError::Unauthorized`] for 401
/// - [`ApiError::RequestFailed`] for any other non-2xx status
/// - [`ApiError::Json`] when a 2xx body is not valid JSON
pub fn classify(response: &HttpResponse) -> Result<Value, ApiError> {
    if response.status == UNAUTHORIZED_STATUS {
        return Err(ApiError::Unauthorized);
    }
    if !response.is_success() {
        return Err(ApiError::RequestFailed { status: response.status, message: error_message(response) });
    }
    if response.status == NO_CONTENT_STATUS {
        return Ok(Value::Bool(true));
    }
    Ok(serde_json::from_str(&response.body)?)
}

/// Best-effort human-readable message for a failed response.
#[must_use]
pub fn error_message(response: &HttpResponse) -> String {
    match serde_json::from_str::<Value>(&response.body) {
        Ok(body) => structured_message(body),
        Err(_) => unstructured_message(response),
    }
}

fn structured_message(body: Value) -> String {
    match body {
        Value::Object(ref map) => ["detail", "message"]
            .iter()
            .filter_map(|key| map.get(*key))
            .find_map(readable_field)
            .unwrap_or_else(|| body.to_string()),
        Value::String(text) => text,
        other => other.to_string(),
    }
}

/// A field counts as readable when it is a non-empty string or a non-empty
/// structured value (FastAPI validation errors put a list under `detail`).
fn readable_field(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn unstructured_message(response: &HttpResponse) -> String {
    let is_plain_text = response
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("text/plain"));
    let text = response.body.trim();
    if is_plain_text && !text.is_empty() {
        return text.to_owned();
    }
    format!("HTTP {}: {}", response.status, response.status_text)
}
