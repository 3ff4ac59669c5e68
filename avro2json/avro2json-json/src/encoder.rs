//! Schema-driven JSON encoding of generic values.

use std::io::Write;

use avro2json_core::{ConformanceError, ResolvedSchema, Schema, Value};
use serde_json::{Map, Number, Value as Json};

use crate::error::EncodeError;

/// Written between consecutive units, in both compact and pretty mode.
pub const UNIT_SEPARATOR: &[u8] = b"\n";

/// Writes one JSON unit per [`write`](Self::write) call to an output stream.
///
/// The encoder is bound to one schema and one output for its whole life.
/// Units are separated by [`UNIT_SEPARATOR`]; nothing is written before the
/// first unit or after the last one.
pub struct JsonEncoder<'s, W: Write> {
    schema: &'s ResolvedSchema,
    out: W,
    pretty: bool,
    units: u64,
}

impl<'s, W: Write> JsonEncoder<'s, W> {
    pub fn new(schema: &'s ResolvedSchema, out: W, pretty: bool) -> Self {
        Self {
            schema,
            out,
            pretty,
            units: 0,
        }
    }

    /// Encode `value` under the root schema and write it as one unit.
    ///
    /// Nothing is written when the value does not conform to the schema.
    pub fn write(&mut self, value: &Value) -> Result<(), EncodeError> {
        let json = value_to_json(self.schema, value)?;
        if self.units > 0 {
            self.out.write_all(UNIT_SEPARATOR)?;
        }
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, &json)?;
        } else {
            serde_json::to_writer(&mut self.out, &json)?;
        }
        self.units += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), EncodeError> {
        self.out.flush()?;
        Ok(())
    }

    /// Number of units written so far.
    pub fn units_written(&self) -> u64 {
        self.units
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Convert `value` into its Avro JSON encoding under `schema`'s root type.
pub fn value_to_json(schema: &ResolvedSchema, value: &Value) -> Result<Json, ConformanceError> {
    to_json(schema, schema.root(), value, "$")
}

fn to_json(
    resolved: &ResolvedSchema,
    schema: &Schema,
    value: &Value,
    path: &str,
) -> Result<Json, ConformanceError> {
    let schema = resolved.resolve(schema)?;
    if let Schema::Union(union) = schema {
        let (_, branch, inner) = resolved.select_branch(union, value, path)?;
        let branch = resolved.resolve(branch)?;
        if matches!(branch, Schema::Null) {
            return Ok(Json::Null);
        }
        let mut wrapper = Map::with_capacity(1);
        wrapper.insert(branch.branch_name(), to_json(resolved, branch, inner, path)?);
        return Ok(Json::Object(wrapper));
    }

    Ok(match (schema, value.unwrap_union()) {
        (Schema::Null, Value::Null) => Json::Null,
        (Schema::Boolean, Value::Boolean(b)) => Json::Bool(*b),
        (Schema::Int, Value::Int(n)) => Json::from(*n),
        (Schema::Long, Value::Long(n)) => Json::from(*n),
        (Schema::Float, Value::Float(f)) => float_to_json(*f),
        (Schema::Double, Value::Double(f)) => double_to_json(*f),
        (Schema::Bytes, Value::Bytes(b)) => Json::String(bytes_to_string(b)),
        (Schema::String, Value::String(s)) => Json::String(s.to_string()),
        (Schema::Fixed(fixed), Value::Fixed(b)) => {
            if b.len() != fixed.size {
                return Err(ConformanceError::FixedSize {
                    path: path.to_string(),
                    fixed_name: fixed.name.fullname(),
                    expected: fixed.size,
                    found: b.len(),
                });
            }
            Json::String(bytes_to_string(b))
        }
        (Schema::Enum(e), Value::Enum(_, symbol)) => {
            if e.index_of(symbol).is_none() {
                return Err(ConformanceError::UnknownSymbol {
                    path: path.to_string(),
                    symbol: symbol.to_string(),
                    enum_name: e.name.fullname(),
                });
            }
            Json::String(symbol.to_string())
        }
        (Schema::Array(items), Value::Array(elements)) => Json::Array(
            elements
                .iter()
                .enumerate()
                .map(|(i, element)| to_json(resolved, items, element, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        (Schema::Map(values), Value::Map(entries)) => {
            let mut object = Map::with_capacity(entries.len());
            for (key, entry) in entries {
                let entry = to_json(resolved, values, entry, &format!("{path}.{key}"))?;
                object.insert(key.to_string(), entry);
            }
            Json::Object(object)
        }
        (Schema::Record(record), record_value @ Value::Record(_)) => {
            let mut object = Map::with_capacity(record.fields.len());
            for field in &record.fields {
                let field_value =
                    record_value
                        .field(&field.name)
                        .ok_or_else(|| ConformanceError::MissingField {
                            path: path.to_string(),
                            field: field.name.clone(),
                        })?;
                let field_path = format!("{path}.{}", field.name);
                object.insert(
                    field.name.clone(),
                    to_json(resolved, &field.schema, field_value, &field_path)?,
                );
            }
            Json::Object(object)
        }
        (schema, other) => return Err(ConformanceError::mismatch(path, schema, other)),
    })
}

/// Bytes are written as a string of code points U+0000..=U+00FF, one per byte.
fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Floats print their shortest `f32` form rather than the widened `f64` one.
fn float_to_json(f: f32) -> Json {
    if !f.is_finite() {
        return non_finite(f64::from(f));
    }
    let widened = f.to_string().parse::<f64>().unwrap_or(f64::from(f));
    double_to_json(widened)
}

fn double_to_json(f: f64) -> Json {
    Number::from_f64(f).map_or_else(|| non_finite(f), Json::Number)
}

fn non_finite(f: f64) -> Json {
    let text = if f.is_nan() {
        "NaN"
    } else if f.is_sign_positive() {
        "Infinity"
    } else {
        "-Infinity"
    };
    Json::String(text.to_string())
}
