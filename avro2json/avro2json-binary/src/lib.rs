//! Avro binary encoding driven by a schema discovered at read time.
//!
//! Key components:
//! - [`decode_value`]: binary datum → [`avro2json_core::Value`]
//! - [`encode_value`]: [`avro2json_core::Value`] → binary datum
//! - [`varint`]: zig-zag variable-length integers shared with the container framing

mod decode;
mod encode;
mod error;
pub mod varint;

pub use decode::{MAX_ZERO_WIDTH_ITEMS, decode_value};
pub use encode::encode_value;
pub use error::DecodeError;
