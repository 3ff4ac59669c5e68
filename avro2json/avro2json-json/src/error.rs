//! Error types for the JSON encoder and decoder.

use avro2json_core::{ConformanceError, SchemaError};

/// Error returned by [`JsonEncoder`](crate::JsonEncoder).
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// The value does not have the shape the schema describes.
    #[error(transparent)]
    Conformance(#[from] ConformanceError),

    /// Writing to the output stream failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error returned by [`json_to_value`](crate::json_to_value) and
/// [`JsonDecoder`](crate::JsonDecoder).
#[derive(Debug, thiserror::Error)]
pub enum JsonDecodeError {
    #[error("invalid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("expected {expected} at {path}, found {found}")]
    Mismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("record at {path} is missing field '{field}' and it has no default")]
    MissingField { path: String, field: String },

    #[error("'{symbol}' at {path} is not a symbol of enum {enum_name}")]
    UnknownSymbol {
        path: String,
        symbol: String,
        enum_name: String,
    },

    #[error("fixed {fixed_name} at {path} expects {expected} bytes, found {found}")]
    FixedSize {
        path: String,
        fixed_name: String,
        expected: usize,
        found: usize,
    },

    #[error("union at {path} has no branch named '{branch}'")]
    UnknownBranch { path: String, branch: String },

    #[error("character U+{code:04X} at {path} does not encode a byte")]
    ByteRange { path: String, code: u32 },

    #[error("number at {path} is out of range for {expected}")]
    NumberRange { path: String, expected: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
