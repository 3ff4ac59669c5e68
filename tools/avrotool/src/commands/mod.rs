pub mod getmeta;
pub mod getschema;
pub mod tojson;
