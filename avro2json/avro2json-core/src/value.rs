//! Generic value representation produced by the binary decoder.

use std::sync::Arc;

use crate::error::ValueTypeError;

/// Value decoded under a schema discovered at read time.
///
/// Variant names mirror the Avro type tags of [`Schema`](crate::Schema).
/// Records and maps keep their entries in decode order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Arc<[u8]>),
    String(Arc<str>),
    Fixed(Arc<[u8]>),
    /// Symbol index and symbol name.
    Enum(u32, Arc<str>),
    Array(Vec<Value>),
    Map(Vec<(Arc<str>, Value)>),
    Record(Vec<(Arc<str>, Value)>),
    /// Branch index into the union schema and the branch value.
    Union(u32, Box<Value>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn bytes(b: impl AsRef<[u8]>) -> Self {
        Self::Bytes(Arc::from(b.as_ref()))
    }

    pub fn fixed(b: impl AsRef<[u8]>) -> Self {
        Self::Fixed(Arc::from(b.as_ref()))
    }

    pub fn enum_symbol(index: u32, symbol: impl AsRef<str>) -> Self {
        Self::Enum(index, Arc::from(symbol.as_ref()))
    }

    pub fn union(index: u32, value: Value) -> Self {
        Self::Union(index, Box::new(value))
    }

    /// Build a record value from `(field name, value)` pairs.
    pub fn record<K: AsRef<str>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Record(
            fields
                .into_iter()
                .map(|(name, value)| (Arc::from(name.as_ref()), value))
                .collect(),
        )
    }

    /// Build a map value from `(key, value)` pairs.
    pub fn map<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Self::Map(
            entries
                .into_iter()
                .map(|(key, value)| (Arc::from(key.as_ref()), value))
                .collect(),
        )
    }

    /// Strip any number of [`Value::Union`] wrappers.
    pub fn unwrap_union(&self) -> &Value {
        match self {
            Value::Union(_, inner) => inner.unwrap_union(),
            other => other,
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(fields) => fields
                .iter()
                .find(|(field_name, _)| field_name.as_ref() == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        match self.unwrap_union() {
            Value::Long(v) => Ok(Some(*v)),
            Value::Int(v) => Ok(Some(i64::from(*v))),
            Value::Null => Ok(None),
            other => Err(other.type_mismatch("Long")),
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self.unwrap_union() {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Enum(_, symbol) => Ok(Some(symbol.as_ref())),
            Value::Null => Ok(None),
            other => Err(other.type_mismatch("String")),
        }
    }

    pub fn try_bytes(&self) -> Result<Option<&[u8]>, ValueTypeError> {
        match self.unwrap_union() {
            Value::Bytes(v) | Value::Fixed(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            other => Err(other.type_mismatch("Bytes")),
        }
    }

    fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Boolean(_) => "Boolean",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Bytes(_) => "Bytes",
            Value::String(_) => "String",
            Value::Fixed(_) => "Fixed",
            Value::Enum(_, _) => "Enum",
            Value::Array(_) => "Array",
            Value::Map(_) => "Map",
            Value::Record(_) => "Record",
            Value::Union(_, _) => "Union",
        }
    }
}
