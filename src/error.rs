//! Error types for loading and aggregating site catalogues.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while acquiring or interpreting a catalogue.
///
/// Malformed individual records are never errors; they are counted as
/// invalid by the aggregator.
#[derive(Error, Debug)]
pub enum StatsError {
    /// The document is not a mapping from category name to a list of records.
    #[error("Invalid input shape: {0}")]
    InputShape(String),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid catalogue URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch catalogue: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Server returned {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Short name of a JSON value's kind, for shape diagnostics.
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_kind() {
        assert_eq!(json_kind(&json!(null)), "null");
        assert_eq!(json_kind(&json!([1, 2])), "an array");
        assert_eq!(json_kind(&json!({"a": 1})), "an object");
        assert_eq!(json_kind(&json!("x")), "a string");
    }

    #[test]
    fn test_input_shape_message() {
        let err = StatsError::InputShape("expected an object".to_string());
        assert_eq!(err.to_string(), "Invalid input shape: expected an object");
    }
}
