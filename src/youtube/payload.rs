//! Decoding of API response bodies.

use serde_json::Value;
use thiserror::Error;

use super::Mode;

/// The response body is not the structured document the mode expects.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The body is not valid JSON.
    #[error("Response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// A list mode received a document without an `items` array
    /// (typically an API error object).
    #[error("Response for {mode} has no 'items' list")]
    MissingItems {
        /// The mode that expected the list
        mode: Mode,
    },
}

/// Parses a response body into the payload for `mode`.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] when the body is not JSON, and
/// [`FetchError::MissingItems`] when a list mode gets a document whose
/// `items` field is absent or not an array.
pub fn decode_payload(mode: Mode, body: &[u8]) -> Result<Value, FetchError> {
    let payload: Value = serde_json::from_slice(body)?;

    if mode.is_list() && !payload.get("items").is_some_and(Value::is_array) {
        return Err(FetchError::MissingItems { mode });
    }

    Ok(payload)
}

/// Returns the `items` list of a payload, or an empty slice if the
/// payload has none.
#[must_use]
pub fn items(payload: &Value) -> &[Value] {
    payload
        .get("items")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}
