//! Block compression codecs named by the `avro.codec` metadata entry.

use std::{
    fmt,
    io::{self, Read, Write},
};

use bzip2::{read::BzDecoder, write::BzEncoder};
use flate2::{Compression, read::DeflateDecoder, write::DeflateEncoder};
use xz2::{read::XzDecoder, write::XzEncoder};

use crate::error::ContainerError;

/// Bytes of the big-endian CRC32 that trails every snappy block.
const SNAPPY_CRC_LEN: usize = 4;

const XZ_PRESET: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    #[default]
    Null,
    /// Raw deflate (RFC 1951), without zlib or gzip framing.
    Deflate,
    /// Raw snappy followed by the CRC32 of the uncompressed block.
    Snappy,
    Bzip2,
    Xz,
    Zstandard,
}

impl Codec {
    pub const ALL: [Codec; 6] = [
        Self::Null,
        Self::Deflate,
        Self::Snappy,
        Self::Bzip2,
        Self::Xz,
        Self::Zstandard,
    ];

    /// Look up a codec by its metadata name.
    pub fn from_name(name: &str) -> Result<Self, ContainerError> {
        Self::ALL
            .into_iter()
            .find(|codec| codec.name() == name)
            .ok_or_else(|| ContainerError::UnsupportedCodec(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Deflate => "deflate",
            Self::Snappy => "snappy",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
            Self::Zstandard => "zstandard",
        }
    }

    pub(crate) fn decompress(self, data: Vec<u8>) -> io::Result<Vec<u8>> {
        match self {
            Self::Null => Ok(data),
            Self::Deflate => read_all(DeflateDecoder::new(data.as_slice()), data.len()),
            Self::Snappy => snappy_decompress(&data),
            Self::Bzip2 => read_all(BzDecoder::new(data.as_slice()), data.len()),
            Self::Xz => read_all(XzDecoder::new(data.as_slice()), data.len()),
            Self::Zstandard => zstd::decode_all(data.as_slice()),
        }
    }

    pub(crate) fn compress(self, data: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Null => Ok(data.to_vec()),
            Self::Deflate => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Snappy => {
                let mut out = snap::raw::Encoder::new()
                    .compress_vec(data)
                    .map_err(io::Error::other)?;
                out.extend_from_slice(&crc32fast::hash(data).to_be_bytes());
                Ok(out)
            }
            Self::Bzip2 => {
                let mut encoder = BzEncoder::new(Vec::new(), bzip2::Compression::default());
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Xz => {
                let mut encoder = XzEncoder::new(Vec::new(), XZ_PRESET);
                encoder.write_all(data)?;
                encoder.finish()
            }
            Self::Zstandard => zstd::encode_all(data, 0),
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn read_all(mut decoder: impl Read, hint: usize) -> io::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(hint.saturating_mul(2));
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

fn snappy_decompress(data: &[u8]) -> io::Result<Vec<u8>> {
    let Some(split) = data.len().checked_sub(SNAPPY_CRC_LEN) else {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "snappy block is shorter than its checksum",
        ));
    };
    let (compressed, crc) = data.split_at(split);
    let out = snap::raw::Decoder::new()
        .decompress_vec(compressed)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let expected = u32::from_be_bytes([crc[0], crc[1], crc[2], crc[3]]);
    let actual = crc32fast::hash(&out);
    if actual != expected {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("snappy checksum mismatch: expected {expected:08x}, got {actual:08x}"),
        ));
    }
    Ok(out)
}
