//! Zig-zag variable-length integers used for Avro `int` and `long`.

use bytes::{Buf, BufMut};

/// Longest varint encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

/// Outcome of reading a varint from a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    Eof,
    Overflow,
}

/// Read one zig-zag varint from `buf`.
pub fn get_long(buf: &mut impl Buf) -> Result<i64, VarintError> {
    let mut raw: u64 = 0;
    for i in 0..MAX_VARINT_LEN {
        if !buf.has_remaining() {
            return Err(VarintError::Eof);
        }
        let byte = buf.get_u8();
        raw |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            // The tenth byte may only carry the top bit of a 64-bit value.
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(VarintError::Overflow);
            }
            return Ok(zigzag_decode(raw));
        }
    }
    Err(VarintError::Overflow)
}

/// Append `n` as a zig-zag varint.
pub fn put_long(buf: &mut impl BufMut, n: i64) {
    let mut raw = zigzag_encode(n);
    while raw >= 0x80 {
        buf.put_u8((raw as u8 & 0x7f) | 0x80);
        raw >>= 7;
    }
    buf.put_u8(raw as u8);
}
