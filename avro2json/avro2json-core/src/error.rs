//! Error types for schema parsing and value access.

/// Error returned while parsing or resolving a [`Schema`](crate::Schema).
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema text is not valid JSON.
    #[error("schema is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema JSON is well-formed but violates a schema rule.
    #[error("invalid schema at {path}: {detail}")]
    Invalid { path: String, detail: String },

    /// A type name is neither a primitive nor a previously defined named type.
    #[error("unknown type '{name}' at {path}")]
    UnknownType { name: String, path: String },

    /// A named type was defined twice.
    #[error("named type '{fullname}' is defined more than once")]
    DuplicateName { fullname: String },

    /// A reference could not be resolved against the named type table.
    #[error("reference to undefined named type '{fullname}'")]
    UndefinedName { fullname: String },
}

impl SchemaError {
    pub(crate) fn invalid(path: &str, detail: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            detail: detail.into(),
        }
    }
}

/// A [`Value`](crate::Value) accessor found a different variant than requested.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type mismatch: expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: &'static str) -> Self {
        Self {
            expected: expected.into(),
            actual,
        }
    }
}
