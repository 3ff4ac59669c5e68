//! Avro object container files and their bounded JSON dump.
//!
//! - [`ContainerReader`] reads a container's header and yields its records.
//! - [`ContainerWriter`] writes containers.
//! - [`dump_to_json`] re-encodes up to a head count of records as JSON.

mod codec;
mod container;
mod dump;
mod error;

pub use avro2json_binary as binary;
pub use avro2json_core as core;
pub use avro2json_json as json;
pub use codec::Codec;
pub use container::{
    CODEC_KEY, ContainerReader, ContainerWriter, DEFAULT_BLOCK_SIZE, MAGIC, Metadata, SCHEMA_KEY,
    SYNC_SIZE, SyncMarker,
};
pub use dump::{DEFAULT_HEAD_COUNT, DumpOptions, DumpSummary, HeadCount, dump_to_json};
pub use error::{ContainerError, DumpError};
