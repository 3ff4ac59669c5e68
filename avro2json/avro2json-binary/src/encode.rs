//! Generic [`Value`] → Avro binary encoding.

use avro2json_core::{ConformanceError, ResolvedSchema, Schema, Value};
use bytes::BufMut;

use crate::varint::put_long;

/// Append the binary encoding of `value`, written as `schema`'s root type.
///
/// Arrays and maps are written as a single block followed by the zero-count
/// terminator.
pub fn encode_value(
    schema: &ResolvedSchema,
    value: &Value,
    buf: &mut impl BufMut,
) -> Result<(), ConformanceError> {
    encode(schema, schema.root(), value, buf, "$")
}

fn encode(
    resolved: &ResolvedSchema,
    schema: &Schema,
    value: &Value,
    buf: &mut impl BufMut,
    path: &str,
) -> Result<(), ConformanceError> {
    let schema = resolved.resolve(schema)?;
    if let Schema::Union(union) = schema {
        let (index, branch, inner) = resolved.select_branch(union, value, path)?;
        put_long(buf, index as i64);
        return encode(resolved, branch, inner, buf, path);
    }

    match (schema, value.unwrap_union()) {
        (Schema::Null, Value::Null) => {}
        (Schema::Boolean, Value::Boolean(b)) => buf.put_u8(u8::from(*b)),
        (Schema::Int, Value::Int(n)) => put_long(buf, i64::from(*n)),
        (Schema::Long, Value::Long(n)) => put_long(buf, *n),
        (Schema::Float, Value::Float(f)) => buf.put_f32_le(*f),
        (Schema::Double, Value::Double(f)) => buf.put_f64_le(*f),
        (Schema::Bytes, Value::Bytes(b)) => put_sized(buf, b),
        (Schema::String, Value::String(s)) => put_sized(buf, s.as_bytes()),
        (Schema::Fixed(fixed), Value::Fixed(b)) => {
            if b.len() != fixed.size {
                return Err(ConformanceError::FixedSize {
                    path: path.to_string(),
                    fixed_name: fixed.name.fullname(),
                    expected: fixed.size,
                    found: b.len(),
                });
            }
            buf.put_slice(b);
        }
        (Schema::Enum(e), Value::Enum(_, symbol)) => {
            let index = e
                .index_of(symbol)
                .ok_or_else(|| ConformanceError::UnknownSymbol {
                    path: path.to_string(),
                    symbol: symbol.to_string(),
                    enum_name: e.name.fullname(),
                })?;
            put_long(buf, index as i64);
        }
        (Schema::Array(items), Value::Array(elements)) => {
            if !elements.is_empty() {
                put_long(buf, elements.len() as i64);
                for (i, element) in elements.iter().enumerate() {
                    encode(resolved, items, element, buf, &format!("{path}[{i}]"))?;
                }
            }
            put_long(buf, 0);
        }
        (Schema::Map(values), Value::Map(entries)) => {
            if !entries.is_empty() {
                put_long(buf, entries.len() as i64);
                for (key, entry) in entries {
                    put_sized(buf, key.as_bytes());
                    encode(resolved, values, entry, buf, &format!("{path}.{key}"))?;
                }
            }
            put_long(buf, 0);
        }
        (Schema::Record(record), record_value @ Value::Record(_)) => {
            for field in &record.fields {
                let field_path = format!("{path}.{}", field.name);
                let field_value =
                    record_value
                        .field(&field.name)
                        .ok_or_else(|| ConformanceError::MissingField {
                            path: path.to_string(),
                            field: field.name.clone(),
                        })?;
                encode(resolved, &field.schema, field_value, buf, &field_path)?;
            }
        }
        (schema, other) => return Err(ConformanceError::mismatch(path, schema, other)),
    }
    Ok(())
}

fn put_sized(buf: &mut impl BufMut, bytes: &[u8]) {
    put_long(buf, bytes.len() as i64);
    buf.put_slice(bytes);
}
