//! Avro schema representation and its JSON text parser.

mod parse;
mod resolved;
mod types;

pub use resolved::ResolvedSchema;
pub use types::{
    EnumSchema, FixedSchema, Name, RecordField, RecordSchema, Schema, UnionSchema,
};
