//! Writer for Avro object container files.

use std::io::Write;

use avro2json_binary::{encode_value, varint::put_long};
use avro2json_core::{ResolvedSchema, Value};
use bytes::BufMut;
use tracing::trace;

use super::header::{CODEC_KEY, Metadata, SCHEMA_KEY, SYNC_SIZE, SyncMarker, write_header};
use crate::{codec::Codec, error::ContainerError};

/// Objects per block unless configured with [`ContainerWriter::with_block_size`].
pub const DEFAULT_BLOCK_SIZE: usize = 1000;

/// Writes values as an object container.
///
/// The header goes out with the first block, so the `with_*` options can be
/// chained right after [`new`](Self::new). Call [`finish`](Self::finish) to
/// write the last partial block.
pub struct ContainerWriter<W: Write> {
    out: W,
    schema: ResolvedSchema,
    schema_text: String,
    codec: Codec,
    sync: SyncMarker,
    metadata: Metadata,
    block_size: usize,
    pending: Vec<u8>,
    pending_objects: u64,
    header_written: bool,
}

impl<W: Write> ContainerWriter<W> {
    /// Create a writer for values of the schema given as JSON text.
    pub fn new(out: W, schema_text: &str) -> Result<Self, ContainerError> {
        let schema = ResolvedSchema::parse_str(schema_text)?;
        Ok(Self {
            out,
            schema,
            schema_text: schema_text.to_string(),
            codec: Codec::Null,
            sync: default_sync_marker(schema_text),
            metadata: Metadata::new(),
            block_size: DEFAULT_BLOCK_SIZE,
            pending: Vec::new(),
            pending_objects: 0,
            header_written: false,
        })
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    /// Replace the sync marker, which otherwise derives from the schema text.
    pub fn with_sync_marker(mut self, sync: SyncMarker) -> Self {
        self.sync = sync;
        self
    }

    /// Add a user metadata entry. `avro.schema` and `avro.codec` are always
    /// written by the writer itself.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Maximum objects per block; zero is treated as one.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Append one value, writing a block once `block_size` values are pending.
    ///
    /// A value that does not conform to the schema is rejected and leaves the
    /// pending block untouched.
    pub fn append(&mut self, value: &Value) -> Result<(), ContainerError> {
        let start = self.pending.len();
        if let Err(e) = encode_value(&self.schema, value, &mut self.pending) {
            self.pending.truncate(start);
            return Err(e.into());
        }
        self.pending_objects += 1;
        if self.pending_objects >= self.block_size as u64 {
            self.write_block()?;
        }
        Ok(())
    }

    /// Write pending values as a block and flush the output.
    ///
    /// On a write error the block stays pending and is written again by the
    /// next `flush`, `finish`, or full block.
    pub fn flush(&mut self) -> Result<(), ContainerError> {
        self.write_block()?;
        self.out.flush()?;
        Ok(())
    }

    /// Write the header if nothing was appended, the last block, and return
    /// the output.
    pub fn finish(mut self) -> Result<W, ContainerError> {
        self.flush()?;
        Ok(self.out)
    }

    fn write_header(&mut self) -> Result<(), ContainerError> {
        if self.header_written {
            return Ok(());
        }
        let mut metadata = self.metadata.clone();
        metadata.insert(SCHEMA_KEY.to_string(), self.schema_text.clone().into_bytes());
        metadata.insert(CODEC_KEY.to_string(), self.codec.name().as_bytes().to_vec());

        let mut buf = Vec::new();
        write_header(&mut buf, &metadata, &self.sync);
        self.out.write_all(&buf)?;
        self.header_written = true;
        Ok(())
    }

    fn write_block(&mut self) -> Result<(), ContainerError> {
        self.write_header()?;
        if self.pending_objects == 0 {
            return Ok(());
        }

        // pending is kept until the frame is written so a failed write can be retried
        let data = self.codec.compress(&self.pending)?;
        let mut frame = Vec::with_capacity(data.len() + 2 * 10 + SYNC_SIZE);
        put_long(&mut frame, self.pending_objects as i64);
        put_long(&mut frame, data.len() as i64);
        frame.put_slice(&data);
        frame.put_slice(&self.sync);
        self.out.write_all(&frame)?;

        trace!(
            objects = self.pending_objects,
            bytes = data.len(),
            codec = %self.codec,
            "wrote block"
        );
        self.pending.clear();
        self.pending_objects = 0;
        Ok(())
    }
}

/// Derived from the schema text with CRC32, so equal schemas get equal
/// markers across runs and platforms.
fn default_sync_marker(schema_text: &str) -> SyncMarker {
    let mut sync = [0u8; SYNC_SIZE];
    for (seed, chunk) in sync.chunks_exact_mut(4).enumerate() {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&(seed as u32).to_le_bytes());
        hasher.update(schema_text.as_bytes());
        chunk.copy_from_slice(&hasher.finalize().to_le_bytes());
    }
    sync
}
