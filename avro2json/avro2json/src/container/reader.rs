//! Streaming reader for Avro object container files.

use std::{
    io::{BufReader, Read},
    iter::FusedIterator,
    sync::Arc,
};

use avro2json_binary::decode_value;
use avro2json_core::{ResolvedSchema, Value};
use bytes::{Buf, Bytes};
use tracing::{debug, trace};

use super::header::{
    CODEC_KEY, Header, Metadata, SCHEMA_KEY, SyncMarker, read_exact, read_header, read_len,
    read_long, read_long_or_eof,
};
use crate::{codec::Codec, error::ContainerError};

/// Reads the header of a container on [`open`](Self::open), then yields its
/// objects one at a time as generic [`Value`]s.
///
/// Blocks are read and decompressed lazily, one when the previous one is
/// exhausted. The iterator ends when the stream ends at a block boundary and
/// stops for good after the first error.
///
/// The underlying stream is released by [`close`](Self::close) or on drop,
/// whichever comes first.
pub struct ContainerReader<R: Read> {
    input: Option<BufReader<R>>,
    schema: Arc<ResolvedSchema>,
    metadata: Metadata,
    codec: Codec,
    sync: SyncMarker,
    block: Bytes,
    block_objects: u64,
    block_decoded: u64,
    blocks_read: u64,
    failed: bool,
}

impl<R: Read> ContainerReader<R> {
    /// Read and validate the container header.
    pub fn open(input: R) -> Result<Self, ContainerError> {
        let mut input = BufReader::new(input);
        let Header { metadata, sync } = read_header(&mut input)?;

        let schema_text = metadata
            .get(SCHEMA_KEY)
            .ok_or(ContainerError::MissingSchema)?;
        let schema_text = std::str::from_utf8(schema_text)
            .map_err(|_| ContainerError::malformed("'avro.schema' is not UTF-8"))?;
        let schema = ResolvedSchema::parse_str(schema_text)?;

        let codec = match metadata.get(CODEC_KEY) {
            Some(name) => Codec::from_name(&String::from_utf8_lossy(name))?,
            None => Codec::Null,
        };

        debug!(
            %codec,
            root = schema.root().type_name(),
            metadata_entries = metadata.len(),
            "opened container"
        );

        Ok(Self {
            input: Some(input),
            schema: Arc::new(schema),
            metadata,
            codec,
            sync,
            block: Bytes::new(),
            block_objects: 0,
            block_decoded: 0,
            blocks_read: 0,
            failed: false,
        })
    }

    /// The writer schema embedded in the header.
    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    /// Shared handle to the writer schema, usable while the reader is
    /// borrowed mutably.
    pub fn shared_schema(&self) -> Arc<ResolvedSchema> {
        Arc::clone(&self.schema)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    pub fn sync_marker(&self) -> &SyncMarker {
        &self.sync
    }

    pub fn is_closed(&self) -> bool {
        self.input.is_none()
    }

    /// Release the underlying stream. Later calls do nothing, and the
    /// iterator yields `None` from here on.
    pub fn close(&mut self) {
        if self.input.take().is_some() {
            self.block = Bytes::new();
            debug!(blocks = self.blocks_read, "closed container");
        }
    }

    /// Load the next block holding at least one object. Returns `false` when
    /// the stream ends at a block boundary.
    fn next_block(&mut self) -> Result<bool, ContainerError> {
        loop {
            let Some(input) = self.input.as_mut() else {
                return Ok(false);
            };
            let block = self.blocks_read;

            let Some(count) = read_long_or_eof(input, "in a block header")? else {
                return Ok(false);
            };
            let size = read_long(input, "in a block header")?;
            let count = u64::try_from(count).map_err(|_| {
                ContainerError::malformed(format!("block {block} has object count {count}"))
            })?;
            let size = u64::try_from(size).map_err(|_| {
                ContainerError::malformed(format!("block {block} has byte size {size}"))
            })?;

            let data = read_len(input, size, "in a block")?;
            let mut sync = [0u8; 16];
            read_exact(input, &mut sync, "in a block sync marker")?;
            if sync != self.sync {
                return Err(ContainerError::SyncMismatch { block });
            }
            self.blocks_read += 1;
            trace!(block, objects = count, bytes = size, "read block");

            if count == 0 {
                continue;
            }
            let data = self
                .codec
                .decompress(data)
                .map_err(|source| ContainerError::Decompress {
                    block,
                    codec: self.codec.name(),
                    source,
                })?;
            self.block = Bytes::from(data);
            self.block_objects = count;
            self.block_decoded = 0;
            return Ok(true);
        }
    }

    fn next_value(&mut self) -> Result<Option<Value>, ContainerError> {
        if self.block_decoded == self.block_objects && !self.next_block()? {
            return Ok(None);
        }

        let block = self.blocks_read - 1;
        let index = self.block_decoded;
        let value = decode_value(&self.schema, &mut self.block)
            .map_err(|source| ContainerError::Decode {
                block,
                index,
                source,
            })?;
        self.block_decoded += 1;

        if self.block_decoded == self.block_objects && self.block.has_remaining() {
            return Err(ContainerError::TrailingBytes {
                block,
                count: self.block_objects,
                remaining: self.block.remaining(),
            });
        }
        Ok(Some(value))
    }
}

impl<R: Read> Iterator for ContainerReader<R> {
    type Item = Result<Value, ContainerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.is_closed() {
            return None;
        }
        match self.next_value() {
            Ok(value) => value.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for ContainerReader<R> {}

impl<R: Read> Drop for ContainerReader<R> {
    fn drop(&mut self) {
        self.close();
    }
}
