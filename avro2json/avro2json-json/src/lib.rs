//! Avro JSON encoding for [`avro2json_core::Value`].
//!
//! Unions are written as `null` or a single-key object naming the branch,
//! bytes and fixed values as strings of code points U+0000..=U+00FF, and
//! non-finite floats as the strings `"NaN"`, `"Infinity"` and `"-Infinity"`.

mod decoder;
mod encoder;
mod error;

pub use decoder::{JsonDecoder, json_to_value};
pub use encoder::{JsonEncoder, UNIT_SEPARATOR, value_to_json};
pub use error::{EncodeError, JsonDecodeError};
