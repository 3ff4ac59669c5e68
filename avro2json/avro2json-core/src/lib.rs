//! Encoding-agnostic core types for `avro2json`.
//!
//! This crate provides the schema model ([`Schema`] / [`ResolvedSchema`]),
//! parsed from the JSON text embedded in a container header, and the generic
//! [`Value`] produced by the binary decoder and consumed by the encoders.

mod conform;
mod error;
mod schema;
mod value;

pub use conform::ConformanceError;
pub use error::{SchemaError, ValueTypeError};
pub use schema::{
    EnumSchema, FixedSchema, Name, RecordField, RecordSchema, ResolvedSchema, Schema, UnionSchema,
};
pub use value::Value;
