//! Avro JSON encoding → generic values, the inverse of [`crate::JsonEncoder`].

use std::{io::Read, sync::Arc};

use avro2json_core::{ResolvedSchema, Schema, Value};
use serde_json::{Deserializer, StreamDeserializer, Value as Json, de::IoRead};

use crate::error::JsonDecodeError;

/// Reads a stream of whitespace-separated JSON units and decodes each one
/// under the schema's root type.
pub struct JsonDecoder<'s, R: Read> {
    schema: &'s ResolvedSchema,
    stream: StreamDeserializer<'static, IoRead<R>, Json>,
}

impl<'s, R: Read> JsonDecoder<'s, R> {
    pub fn new(schema: &'s ResolvedSchema, input: R) -> Self {
        Self {
            schema,
            stream: Deserializer::from_reader(input).into_iter(),
        }
    }
}

impl<R: Read> Iterator for JsonDecoder<'_, R> {
    type Item = Result<Value, JsonDecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let json = self.stream.next()?;
        Some(
            json.map_err(JsonDecodeError::from)
                .and_then(|json| json_to_value(self.schema, &json)),
        )
    }
}

/// Decode one JSON document under `schema`'s root type.
pub fn json_to_value(schema: &ResolvedSchema, json: &Json) -> Result<Value, JsonDecodeError> {
    from_json(schema, schema.root(), json, "$")
}

fn from_json(
    resolved: &ResolvedSchema,
    schema: &Schema,
    json: &Json,
    path: &str,
) -> Result<Value, JsonDecodeError> {
    let schema = resolved.resolve(schema)?;
    let mismatch = || JsonDecodeError::Mismatch {
        path: path.to_string(),
        expected: schema.branch_name(),
        found: json_kind(json).to_string(),
    };

    Ok(match schema {
        Schema::Null => match json {
            Json::Null => Value::Null,
            _ => return Err(mismatch()),
        },
        Schema::Boolean => Value::Boolean(json.as_bool().ok_or_else(mismatch)?),
        Schema::Int => {
            let n = json.as_i64().ok_or_else(mismatch)?;
            Value::Int(i32::try_from(n).map_err(|_| JsonDecodeError::NumberRange {
                path: path.to_string(),
                expected: "int",
            })?)
        }
        Schema::Long => Value::Long(json.as_i64().ok_or_else(mismatch)?),
        Schema::Float => Value::Float(json_to_f64(json).ok_or_else(mismatch)? as f32),
        Schema::Double => Value::Double(json_to_f64(json).ok_or_else(mismatch)?),
        Schema::Bytes => {
            let text = json.as_str().ok_or_else(mismatch)?;
            Value::Bytes(Arc::from(string_to_bytes(text, path)?))
        }
        Schema::String => Value::String(Arc::from(json.as_str().ok_or_else(mismatch)?)),
        Schema::Fixed(fixed) => {
            let text = json.as_str().ok_or_else(mismatch)?;
            let bytes = string_to_bytes(text, path)?;
            if bytes.len() != fixed.size {
                return Err(JsonDecodeError::FixedSize {
                    path: path.to_string(),
                    fixed_name: fixed.name.fullname(),
                    expected: fixed.size,
                    found: bytes.len(),
                });
            }
            Value::Fixed(Arc::from(bytes))
        }
        Schema::Enum(e) => {
            let symbol = json.as_str().ok_or_else(mismatch)?;
            let index = e
                .index_of(symbol)
                .ok_or_else(|| JsonDecodeError::UnknownSymbol {
                    path: path.to_string(),
                    symbol: symbol.to_string(),
                    enum_name: e.name.fullname(),
                })?;
            Value::Enum(index as u32, Arc::from(symbol))
        }
        Schema::Array(items) => Value::Array(
            json.as_array()
                .ok_or_else(mismatch)?
                .iter()
                .enumerate()
                .map(|(i, element)| from_json(resolved, items, element, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Schema::Map(values) => Value::Map(
            json.as_object()
                .ok_or_else(mismatch)?
                .iter()
                .map(|(key, entry)| {
                    let entry = from_json(resolved, values, entry, &format!("{path}.{key}"))?;
                    Ok((Arc::from(key.as_str()), entry))
                })
                .collect::<Result<_, JsonDecodeError>>()?,
        ),
        Schema::Record(record) => {
            let object = json.as_object().ok_or_else(mismatch)?;
            let mut fields = Vec::with_capacity(record.fields.len());
            for field in &record.fields {
                let field_path = format!("{path}.{}", field.name);
                let value = match (object.get(&field.name), &field.default) {
                    (Some(field_json), _) => {
                        from_json(resolved, &field.schema, field_json, &field_path)?
                    }
                    (None, Some(default)) => {
                        default_to_value(resolved, &field.schema, default, &field_path)?
                    }
                    (None, None) => {
                        return Err(JsonDecodeError::MissingField {
                            path: path.to_string(),
                            field: field.name.clone(),
                        });
                    }
                };
                fields.push((Arc::from(field.name.as_str()), value));
            }
            Value::Record(fields)
        }
        Schema::Union(union) => {
            if json.is_null() {
                let index = union.null_index().ok_or_else(mismatch)?;
                return Ok(Value::Union(index as u32, Box::new(Value::Null)));
            }
            let object = json.as_object().filter(|o| o.len() == 1).ok_or_else(mismatch)?;
            let (branch_name, branch_json) = object.iter().next().ok_or_else(mismatch)?;
            let mut found = None;
            for (i, variant) in union.variants().iter().enumerate() {
                if resolved.resolve(variant)?.branch_name() == *branch_name {
                    found = Some((i, variant));
                    break;
                }
            }
            let (index, branch) = found.ok_or_else(|| JsonDecodeError::UnknownBranch {
                path: path.to_string(),
                branch: branch_name.clone(),
            })?;
            let value = from_json(resolved, branch, branch_json, path)?;
            Value::Union(index as u32, Box::new(value))
        }
        Schema::Ref(_) => unreachable!("references are resolved above"),
    })
}

/// Field defaults of union type are written for the first branch, without
/// the branch wrapper.
fn default_to_value(
    resolved: &ResolvedSchema,
    schema: &Schema,
    default: &Json,
    path: &str,
) -> Result<Value, JsonDecodeError> {
    match resolved.resolve(schema)? {
        Schema::Union(union) => {
            let first = union.variants().first().ok_or_else(|| JsonDecodeError::Mismatch {
                path: path.to_string(),
                expected: "non-empty union".to_string(),
                found: json_kind(default).to_string(),
            })?;
            let value = from_json(resolved, first, default, path)?;
            Ok(Value::Union(0, Box::new(value)))
        }
        _ => from_json(resolved, schema, default, path),
    }
}

fn json_to_f64(json: &Json) -> Option<f64> {
    match json {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => match s.as_str() {
            "NaN" => Some(f64::NAN),
            "Infinity" => Some(f64::INFINITY),
            "-Infinity" => Some(f64::NEG_INFINITY),
            _ => None,
        },
        _ => None,
    }
}

fn string_to_bytes(text: &str, path: &str) -> Result<Vec<u8>, JsonDecodeError> {
    text.chars()
        .map(|c| {
            u8::try_from(c).map_err(|_| JsonDecodeError::ByteRange {
                path: path.to_string(),
                code: u32::from(c),
            })
        })
        .collect()
}

fn json_kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
