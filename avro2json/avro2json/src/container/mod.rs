mod header;
mod reader;
mod writer;

pub use header::{CODEC_KEY, MAGIC, Metadata, SCHEMA_KEY, SYNC_SIZE, SyncMarker};
pub use reader::ContainerReader;
pub use writer::{ContainerWriter, DEFAULT_BLOCK_SIZE};
