//! Structural matching of [`Value`]s against [`Schema`]s shared by the encoders.

use crate::{
    error::SchemaError,
    schema::{ResolvedSchema, Schema, UnionSchema},
    value::Value,
};

/// A value's runtime shape does not conform to the schema driving an encoder.
#[derive(Debug, thiserror::Error)]
pub enum ConformanceError {
    #[error("expected {expected} at {path}, found {found}")]
    Mismatch {
        path: String,
        expected: String,
        found: &'static str,
    },

    #[error("record at {path} is missing field '{field}'")]
    MissingField { path: String, field: String },

    #[error("'{symbol}' at {path} is not a symbol of enum {enum_name}")]
    UnknownSymbol {
        path: String,
        symbol: String,
        enum_name: String,
    },

    #[error("fixed {fixed_name} at {path} expects {expected} bytes, found {found}")]
    FixedSize {
        path: String,
        fixed_name: String,
        expected: usize,
        found: usize,
    },

    #[error("union branch {index} at {path} is out of range ({branches} branches)")]
    UnionIndex {
        path: String,
        index: u32,
        branches: usize,
    },

    #[error("no union branch at {path} accepts a {found} value")]
    NoMatchingBranch { path: String, found: &'static str },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl ConformanceError {
    pub fn mismatch(path: &str, schema: &Schema, value: &Value) -> Self {
        Self::Mismatch {
            path: path.to_string(),
            expected: schema.branch_name(),
            found: value.variant_name(),
        }
    }
}

impl ResolvedSchema {
    /// Pick the union branch a value is written under.
    ///
    /// A [`Value::Union`] names its branch explicitly. Any other value goes to
    /// the first branch, in schema order, whose type accepts it.
    pub fn select_branch<'a>(
        &'a self,
        union: &'a UnionSchema,
        value: &'a Value,
        path: &str,
    ) -> Result<(usize, &'a Schema, &'a Value), ConformanceError> {
        if let Value::Union(index, inner) = value {
            let branch = union
                .variants()
                .get(*index as usize)
                .ok_or_else(|| ConformanceError::UnionIndex {
                    path: path.to_string(),
                    index: *index,
                    branches: union.len(),
                })?;
            return Ok((*index as usize, branch, inner));
        }

        for (i, branch) in union.variants().iter().enumerate() {
            if self.accepts(self.resolve(branch)?, value) {
                return Ok((i, branch, value));
            }
        }
        Err(ConformanceError::NoMatchingBranch {
            path: path.to_string(),
            found: value.variant_name(),
        })
    }

    /// Shallow check used for union branch selection: type tags must agree,
    /// fixed sizes and enum symbols must fit, and a record value must carry
    /// every field the record schema declares.
    fn accepts(&self, schema: &Schema, value: &Value) -> bool {
        match (schema, value) {
            (Schema::Null, Value::Null)
            | (Schema::Boolean, Value::Boolean(_))
            | (Schema::Int, Value::Int(_))
            | (Schema::Long, Value::Long(_))
            | (Schema::Float, Value::Float(_))
            | (Schema::Double, Value::Double(_))
            | (Schema::Bytes, Value::Bytes(_))
            | (Schema::String, Value::String(_))
            | (Schema::Array(_), Value::Array(_))
            | (Schema::Map(_), Value::Map(_)) => true,
            (Schema::Fixed(fixed), Value::Fixed(bytes)) => bytes.len() == fixed.size,
            (Schema::Enum(e), Value::Enum(_, symbol)) => e.index_of(symbol).is_some(),
            (Schema::Record(record), Value::Record(_)) => record
                .fields
                .iter()
                .all(|field| value.field(&field.name).is_some()),
            _ => false,
        }
    }
}
