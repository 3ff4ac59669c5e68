//! Framing shared by the reader and writer: magic, metadata map, sync
//! marker and the varints that prefix every block.

use std::{
    collections::BTreeMap,
    io::{self, Read},
};

use avro2json_binary::varint::{self, MAX_VARINT_LEN};
use bytes::BufMut;

use crate::error::ContainerError;

pub const MAGIC: [u8; 4] = *b"Obj\x01";
pub const SYNC_SIZE: usize = 16;

pub const SCHEMA_KEY: &str = "avro.schema";
pub const CODEC_KEY: &str = "avro.codec";

pub type SyncMarker = [u8; SYNC_SIZE];

/// File metadata, keyed by entry name.
pub type Metadata = BTreeMap<String, Vec<u8>>;

pub(crate) struct Header {
    pub metadata: Metadata,
    pub sync: SyncMarker,
}

pub(crate) fn read_header(r: &mut impl Read) -> Result<Header, ContainerError> {
    let mut magic = [0u8; 4];
    read_exact(r, &mut magic, "in the magic")?;
    if magic != MAGIC {
        return Err(ContainerError::BadMagic { found: magic });
    }

    let metadata = read_metadata(r)?;

    let mut sync = [0u8; SYNC_SIZE];
    read_exact(r, &mut sync, "in the header sync marker")?;
    Ok(Header { metadata, sync })
}

/// The metadata map uses the same block framing as an Avro `map<bytes>`.
fn read_metadata(r: &mut impl Read) -> Result<Metadata, ContainerError> {
    let mut metadata = Metadata::new();
    loop {
        let count = read_long(r, "in the metadata")?;
        if count == 0 {
            return Ok(metadata);
        }
        if count < 0 {
            let _block_size = read_long(r, "in the metadata")?;
        }
        for _ in 0..count.unsigned_abs() {
            let key = read_sized(r, "in a metadata key")?;
            let key = String::from_utf8(key)
                .map_err(|_| ContainerError::malformed("metadata key is not UTF-8"))?;
            let value = read_sized(r, "in a metadata value")?;
            metadata.insert(key, value);
        }
    }
}

/// Read a varint, or `None` if the stream ends before its first byte.
pub(crate) fn read_long_or_eof(
    r: &mut impl Read,
    context: &'static str,
) -> Result<Option<i64>, ContainerError> {
    let mut raw = [0u8; MAX_VARINT_LEN];
    for i in 0..MAX_VARINT_LEN {
        match r.read_exact(&mut raw[i..=i]) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof && i == 0 => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                return Err(ContainerError::Truncated { context });
            }
            Err(e) => return Err(e.into()),
        }
        if raw[i] & 0x80 == 0 {
            let mut encoded = &raw[..=i];
            return varint::get_long(&mut encoded)
                .map(Some)
                .map_err(|_| ContainerError::malformed(format!("bad varint {context}")));
        }
    }
    Err(ContainerError::malformed(format!("bad varint {context}")))
}

pub(crate) fn read_long(r: &mut impl Read, context: &'static str) -> Result<i64, ContainerError> {
    read_long_or_eof(r, context)?.ok_or(ContainerError::Truncated { context })
}

pub(crate) fn read_exact(
    r: &mut impl Read,
    buf: &mut [u8],
    context: &'static str,
) -> Result<(), ContainerError> {
    r.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => ContainerError::Truncated { context },
        _ => ContainerError::Io(e),
    })
}

/// Read exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_len(
    r: &mut impl Read,
    len: u64,
    context: &'static str,
) -> Result<Vec<u8>, ContainerError> {
    let mut out = Vec::new();
    r.by_ref().take(len).read_to_end(&mut out)?;
    if (out.len() as u64) < len {
        return Err(ContainerError::Truncated { context });
    }
    Ok(out)
}

fn read_sized(r: &mut impl Read, context: &'static str) -> Result<Vec<u8>, ContainerError> {
    let len = read_long(r, context)?;
    let len = u64::try_from(len)
        .map_err(|_| ContainerError::malformed(format!("negative length {len} {context}")))?;
    read_len(r, len, context)
}

pub(crate) fn write_header(buf: &mut impl BufMut, metadata: &Metadata, sync: &SyncMarker) {
    buf.put_slice(&MAGIC);
    if !metadata.is_empty() {
        varint::put_long(buf, metadata.len() as i64);
        for (key, value) in metadata {
            put_sized(buf, key.as_bytes());
            put_sized(buf, value);
        }
    }
    varint::put_long(buf, 0);
    buf.put_slice(sync);
}

pub(crate) fn put_sized(buf: &mut impl BufMut, bytes: &[u8]) {
    varint::put_long(buf, bytes.len() as i64);
    buf.put_slice(bytes);
}
