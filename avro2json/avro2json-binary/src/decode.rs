//! Avro binary decoding to the generic [`Value`] type.

use std::sync::Arc;

use avro2json_core::{ResolvedSchema, Schema, Value};
use bytes::{Buf, Bytes};

use crate::{
    error::DecodeError,
    varint::{self, VarintError},
};

/// Upper bound on items in one array whose items encode to zero bytes, such
/// as `null` or an empty record. Other arrays are bounded by the data itself.
pub const MAX_ZERO_WIDTH_ITEMS: u64 = 1 << 24;

/// Named types nested deeper than this count as zero-width.
const MIN_SIZE_DEPTH: usize = 32;

/// Decode one datum of `schema`'s root type from the front of `buf`.
///
/// `buf` is advanced past the datum, so consecutive calls read consecutive
/// objects of a container block.
pub fn decode_value(schema: &ResolvedSchema, buf: &mut Bytes) -> Result<Value, DecodeError> {
    let mut d = Decoder { schema, buf };
    d.decode(schema.root(), "$")
}

struct Decoder<'a> {
    schema: &'a ResolvedSchema,
    buf: &'a mut Bytes,
}

impl Decoder<'_> {
    fn decode(&mut self, schema: &Schema, path: &str) -> Result<Value, DecodeError> {
        let schema = self.schema.resolve(schema)?;
        Ok(match schema {
            Schema::Null => Value::Null,
            Schema::Boolean => {
                let byte = self.read_u8(path)?;
                match byte {
                    0 => Value::Boolean(false),
                    1 => Value::Boolean(true),
                    byte => {
                        return Err(DecodeError::InvalidBoolean {
                            path: path.to_string(),
                            byte,
                        });
                    }
                }
            }
            Schema::Int => {
                let value = self.read_long(path)?;
                let value = i32::try_from(value).map_err(|_| DecodeError::IntOutOfRange {
                    path: path.to_string(),
                    value,
                })?;
                Value::Int(value)
            }
            Schema::Long => Value::Long(self.read_long(path)?),
            Schema::Float => {
                self.ensure(4, path)?;
                Value::Float(self.buf.get_f32_le())
            }
            Schema::Double => {
                self.ensure(8, path)?;
                Value::Double(self.buf.get_f64_le())
            }
            Schema::Bytes => {
                let bytes = self.read_sized(path)?;
                Value::Bytes(Arc::from(bytes.as_ref()))
            }
            Schema::String => Value::String(Arc::from(self.read_string(path)?)),
            Schema::Fixed(fixed) => {
                let bytes = self.read_bytes(fixed.size, path)?;
                Value::Fixed(Arc::from(bytes.as_ref()))
            }
            Schema::Enum(e) => {
                let index = self.read_long(path)?;
                let symbol = usize::try_from(index)
                    .ok()
                    .and_then(|i| e.symbols.get(i))
                    .ok_or_else(|| DecodeError::EnumIndex {
                        path: path.to_string(),
                        index,
                        symbols: e.symbols.len(),
                    })?;
                Value::Enum(index as u32, Arc::from(symbol.as_str()))
            }
            Schema::Array(items) => {
                let item_size = self.min_size(items, 0)?;
                let mut out = Vec::new();
                self.read_blocks(path, item_size, |d, i| {
                    out.push(d.decode(items, &format!("{path}[{i}]"))?);
                    Ok(())
                })?;
                Value::Array(out)
            }
            Schema::Map(values) => {
                // key length prefix
                let item_size = 1 + self.min_size(values, 0)?;
                let mut out = Vec::new();
                self.read_blocks(path, item_size, |d, _| {
                    let key = d.read_string(path)?;
                    let value = d.decode(values, &format!("{path}.{key}"))?;
                    out.push((Arc::from(key), value));
                    Ok(())
                })?;
                Value::Map(out)
            }
            Schema::Record(record) => {
                let mut fields = Vec::with_capacity(record.fields.len());
                for field in &record.fields {
                    let field_path = format!("{path}.{}", field.name);
                    let value = self.decode(&field.schema, &field_path)?;
                    fields.push((Arc::from(field.name.as_str()), value));
                }
                Value::Record(fields)
            }
            Schema::Union(union) => {
                let index = self.read_long(path)?;
                let branch = usize::try_from(index)
                    .ok()
                    .and_then(|i| union.variants().get(i))
                    .ok_or_else(|| DecodeError::UnionIndex {
                        path: path.to_string(),
                        index,
                        branches: union.len(),
                    })?;
                let value = self.decode(branch, path)?;
                Value::Union(index as u32, Box::new(value))
            }
            Schema::Ref(_) => unreachable!("references are resolved above"),
        })
    }

    /// Walk the block framing shared by arrays and maps.
    ///
    /// Each block starts with an item count; a negative count is followed by
    /// the block's byte size. A zero count ends the sequence. Counts are
    /// checked against the bytes left before any item is decoded.
    fn read_blocks(
        &mut self,
        path: &str,
        item_size: usize,
        mut item: impl FnMut(&mut Self, usize) -> Result<(), DecodeError>,
    ) -> Result<(), DecodeError> {
        let mut index = 0;
        loop {
            let count = self.read_long(path)?;
            if count == 0 {
                return Ok(());
            }
            if count < 0 {
                let _block_size = self.read_long(path)?;
            }
            let count = count.unsigned_abs();
            self.check_block_count(path, count, index as u64, item_size)?;
            for _ in 0..count {
                item(self, index)?;
                index += 1;
            }
        }
    }

    fn check_block_count(
        &self,
        path: &str,
        count: u64,
        seen: u64,
        item_size: usize,
    ) -> Result<(), DecodeError> {
        if item_size == 0 {
            let total = seen.saturating_add(count);
            if total > MAX_ZERO_WIDTH_ITEMS {
                return Err(DecodeError::TooManyItems {
                    path: path.to_string(),
                    count: total,
                    limit: MAX_ZERO_WIDTH_ITEMS,
                });
            }
        } else if count > (self.buf.remaining() / item_size) as u64 {
            return Err(DecodeError::BlockCount {
                path: path.to_string(),
                count,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    /// Fewest bytes any datum of `schema` encodes to.
    fn min_size(&self, schema: &Schema, depth: usize) -> Result<usize, DecodeError> {
        if depth > MIN_SIZE_DEPTH {
            return Ok(0);
        }
        Ok(match self.schema.resolve(schema)? {
            Schema::Null => 0,
            Schema::Float => 4,
            Schema::Double => 8,
            Schema::Fixed(fixed) => fixed.size,
            Schema::Record(record) => {
                let mut size = 0usize;
                for field in &record.fields {
                    size = size.saturating_add(self.min_size(&field.schema, depth + 1)?);
                }
                size
            }
            // boolean, varints, length prefixes, block terminators, union index
            _ => 1,
        })
    }

    fn read_long(&mut self, path: &str) -> Result<i64, DecodeError> {
        varint::get_long(&mut *self.buf).map_err(|e| match e {
            VarintError::Eof => DecodeError::UnexpectedEof {
                path: path.to_string(),
            },
            VarintError::Overflow => DecodeError::VarintOverflow {
                path: path.to_string(),
            },
        })
    }

    fn read_u8(&mut self, path: &str) -> Result<u8, DecodeError> {
        self.ensure(1, path)?;
        Ok(self.buf.get_u8())
    }

    fn read_sized(&mut self, path: &str) -> Result<Bytes, DecodeError> {
        let len = self.read_long(path)?;
        let len = usize::try_from(len).map_err(|_| DecodeError::NegativeLength {
            path: path.to_string(),
            len,
        })?;
        self.read_bytes(len, path)
    }

    fn read_string(&mut self, path: &str) -> Result<String, DecodeError> {
        let bytes = self.read_sized(path)?;
        std::str::from_utf8(&bytes)
            .map(str::to_string)
            .map_err(|source| DecodeError::InvalidUtf8 {
                path: path.to_string(),
                source,
            })
    }

    fn read_bytes(&mut self, n: usize, path: &str) -> Result<Bytes, DecodeError> {
        self.ensure(n, path)?;
        Ok(self.buf.split_to(n))
    }

    fn ensure(&self, n: usize, path: &str) -> Result<(), DecodeError> {
        if self.buf.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                path: path.to_string(),
            });
        }
        Ok(())
    }
}
