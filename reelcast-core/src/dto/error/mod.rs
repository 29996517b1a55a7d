//! Error body DTOs
//!
//! The backend reports errors either as JSON (`{"detail": ...}` or
//! `{"error": ...}`) or as plain text.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Extracts the message to surface from a non-2xx response body
///
/// Prefers a non-empty `detail`, then a non-empty `error`. A JSON body that
/// carries either field but no usable value yields `None`, as does an empty
/// body; any other body is returned verbatim.
pub fn error_message(body: &str) -> Option<String> {
    if body.trim().is_empty() {
        return None;
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        let has_fields = parsed.detail.is_some() || parsed.error.is_some();
        let detail = match parsed.detail {
            Some(serde_json::Value::String(detail)) => Some(detail),
            Some(serde_json::Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let message = detail
            .into_iter()
            .chain(parsed.error)
            .find(|m| !m.trim().is_empty());

        if message.is_some() || has_fields {
            return message;
        }
    }

    Some(body.to_string())
}
