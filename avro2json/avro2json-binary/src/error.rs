//! Error type for binary decoding.

use avro2json_core::SchemaError;

/// Error returned by [`decode_value`](crate::decode_value).
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unexpected end of data at {path}")]
    UnexpectedEof { path: String },

    #[error("variable-length integer at {path} does not fit in 64 bits")]
    VarintOverflow { path: String },

    #[error("int at {path} is out of range: {value}")]
    IntOutOfRange { path: String, value: i64 },

    #[error("negative length {len} at {path}")]
    NegativeLength { path: String, len: i64 },

    #[error("invalid boolean byte 0x{byte:02x} at {path}")]
    InvalidBoolean { path: String, byte: u8 },

    #[error("invalid UTF-8 at {path}: {source}")]
    InvalidUtf8 {
        path: String,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("enum index {index} at {path} is out of range ({symbols} symbols)")]
    EnumIndex {
        path: String,
        index: i64,
        symbols: usize,
    },

    #[error("union index {index} at {path} is out of range ({branches} branches)")]
    UnionIndex {
        path: String,
        index: i64,
        branches: usize,
    },

    /// A block announces more items than its remaining bytes can hold.
    #[error("block of {count} items at {path} cannot fit in the {remaining} bytes left")]
    BlockCount {
        path: String,
        count: u64,
        remaining: usize,
    },

    /// An array of zero-width items announces more than
    /// [`MAX_ZERO_WIDTH_ITEMS`](crate::MAX_ZERO_WIDTH_ITEMS) items.
    #[error("array at {path} announces {count} zero-width items, limit is {limit}")]
    TooManyItems { path: String, count: u64, limit: u64 },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
