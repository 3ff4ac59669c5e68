//! Error types for container reading and the JSON dump.

use avro2json_binary::DecodeError;
use avro2json_core::{ConformanceError, SchemaError};
use avro2json_json::EncodeError;

/// Errors produced by [`ContainerReader`](crate::ContainerReader) and
/// [`ContainerWriter`](crate::ContainerWriter).
#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    /// I/O error from the underlying stream.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("not an Avro object container (magic {found:02x?})")]
    BadMagic { found: [u8; 4] },

    /// The stream ended before a header field or a block was complete.
    #[error("container is truncated {context}")]
    Truncated { context: &'static str },

    #[error("malformed container: {detail}")]
    Malformed { detail: String },

    #[error("container metadata has no 'avro.schema' entry")]
    MissingSchema,

    /// The embedded `avro.schema` is not a valid schema.
    #[error("invalid container schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("unsupported codec '{0}'")]
    UnsupportedCodec(String),

    #[error("sync marker mismatch after block {block}")]
    SyncMismatch { block: u64 },

    #[error("block {block} could not be decompressed with {codec}: {source}")]
    Decompress {
        block: u64,
        codec: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("object {index} of block {block}: {source}")]
    Decode {
        block: u64,
        index: u64,
        #[source]
        source: DecodeError,
    },

    #[error("block {block} has {remaining} bytes left after its {count} objects")]
    TrailingBytes {
        block: u64,
        count: u64,
        remaining: usize,
    },

    /// A value handed to [`ContainerWriter::append`](crate::ContainerWriter::append)
    /// does not conform to the writer's schema.
    #[error(transparent)]
    Conformance(#[from] ConformanceError),
}

impl ContainerError {
    /// Whether the error comes from the container's content rather than from
    /// the stream or the caller.
    pub fn is_format_error(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Conformance(_))
    }

    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

/// Error returned by [`dump_to_json`](crate::dump_to_json).
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    /// The input is not a readable container, or a record failed to decode.
    #[error(transparent)]
    Container(#[from] ContainerError),

    /// A record could not be written as JSON.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Writing the trailing newline or flushing the output failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
