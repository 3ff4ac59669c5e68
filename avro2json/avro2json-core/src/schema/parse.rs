//! Schema JSON → [`Schema`] parser.
//!
//! Named types are registered as soon as their name is known, so a record can
//! refer to itself from its own fields. Later uses of a named type become
//! [`Schema::Ref`] entries.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value as Json};

use super::types::{
    EnumSchema, FixedSchema, Name, RecordField, RecordSchema, Schema, UnionSchema,
};
use crate::error::SchemaError;

#[derive(Default)]
pub(crate) struct Parser {
    defined: HashSet<Name>,
    pub(crate) named: HashMap<Name, Schema>,
}

impl Parser {
    pub(crate) fn parse(
        &mut self,
        json: &Json,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        match json {
            Json::String(type_name) => self.parse_type_name(type_name, namespace, path),
            Json::Array(branches) => self.parse_union(branches, namespace, path),
            Json::Object(attrs) => self.parse_object(attrs, namespace, path),
            other => Err(SchemaError::invalid(
                path,
                format!("expected a type name, union or object, found {other}"),
            )),
        }
    }

    fn parse_type_name(
        &mut self,
        type_name: &str,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        if let Some(primitive) = primitive(type_name) {
            return Ok(primitive);
        }

        let mut candidates = Vec::with_capacity(2);
        if !type_name.contains('.')
            && let Some(ns) = namespace
        {
            candidates.push(Name::new(type_name, Some(ns.to_string())));
        }
        candidates.push(Name::from_fullname(type_name));

        candidates
            .into_iter()
            .find(|name| self.defined.contains(name))
            .map(Schema::Ref)
            .ok_or_else(|| SchemaError::UnknownType {
                name: type_name.to_string(),
                path: path.to_string(),
            })
    }

    fn parse_union(
        &mut self,
        branches: &[Json],
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let mut variants = Vec::with_capacity(branches.len());
        let mut seen = HashSet::new();

        for (i, branch) in branches.iter().enumerate() {
            let branch_path = format!("{path}[{i}]");
            let schema = self.parse(branch, namespace, &branch_path)?;
            if matches!(schema, Schema::Union(_)) {
                return Err(SchemaError::invalid(
                    &branch_path,
                    "unions may not immediately contain other unions",
                ));
            }
            let key = schema.branch_name();
            if !seen.insert(key.clone()) {
                return Err(SchemaError::invalid(
                    &branch_path,
                    format!("duplicate union branch '{key}'"),
                ));
            }
            variants.push(schema);
        }

        Ok(Schema::Union(UnionSchema::new(variants)))
    }

    fn parse_object(
        &mut self,
        attrs: &Map<String, Json>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let type_attr = attrs
            .get("type")
            .ok_or_else(|| SchemaError::invalid(path, "missing 'type' attribute"))?;

        let type_name = match type_attr {
            Json::String(s) => s.as_str(),
            nested => return self.parse(nested, namespace, path),
        };

        match type_name {
            "record" | "error" => self.parse_record(attrs, namespace, path),
            "enum" => self.parse_enum(attrs, namespace, path),
            "fixed" => self.parse_fixed(attrs, namespace, path),
            "array" => {
                let items = attrs
                    .get("items")
                    .ok_or_else(|| SchemaError::invalid(path, "array is missing 'items'"))?;
                let items = self.parse(items, namespace, &format!("{path}.items"))?;
                Ok(Schema::Array(Box::new(items)))
            }
            "map" => {
                let values = attrs
                    .get("values")
                    .ok_or_else(|| SchemaError::invalid(path, "map is missing 'values'"))?;
                let values = self.parse(values, namespace, &format!("{path}.values"))?;
                Ok(Schema::Map(Box::new(values)))
            }
            // Primitives (possibly carrying a logicalType) and references.
            other => self.parse_type_name(other, namespace, path),
        }
    }

    fn parse_record(
        &mut self,
        attrs: &Map<String, Json>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let name = self.define_name(attrs, namespace, path)?;
        let fields_json = attrs
            .get("fields")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::invalid(path, "record is missing a 'fields' array"))?;

        let record_ns = name.namespace.clone();
        let mut fields = Vec::with_capacity(fields_json.len());
        let mut field_names = HashSet::new();

        for (i, field_json) in fields_json.iter().enumerate() {
            let field_path = format!("{path}.fields[{i}]");
            let field_attrs = field_json
                .as_object()
                .ok_or_else(|| SchemaError::invalid(&field_path, "field must be an object"))?;
            let field_name = required_str(field_attrs, "name", &field_path)?;
            if !is_valid_name(field_name) {
                return Err(SchemaError::invalid(
                    &field_path,
                    format!("invalid field name '{field_name}'"),
                ));
            }
            if !field_names.insert(field_name.to_string()) {
                return Err(SchemaError::invalid(
                    &field_path,
                    format!("duplicate field name '{field_name}'"),
                ));
            }
            let type_json = field_attrs
                .get("type")
                .ok_or_else(|| SchemaError::invalid(&field_path, "field is missing 'type'"))?;
            let schema = self.parse(
                type_json,
                record_ns.as_deref(),
                &format!("{path}.{field_name}"),
            )?;

            fields.push(RecordField {
                name: field_name.to_string(),
                schema,
                default: field_attrs.get("default").cloned(),
                doc: optional_str(field_attrs, "doc"),
            });
        }

        let record = Schema::Record(RecordSchema {
            name: name.clone(),
            doc: optional_str(attrs, "doc"),
            aliases: string_list(attrs, "aliases"),
            fields,
        });
        self.named.insert(name, record.clone());
        Ok(record)
    }

    fn parse_enum(
        &mut self,
        attrs: &Map<String, Json>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let name = self.define_name(attrs, namespace, path)?;
        let symbols_json = attrs
            .get("symbols")
            .and_then(Json::as_array)
            .ok_or_else(|| SchemaError::invalid(path, "enum is missing a 'symbols' array"))?;

        let mut symbols = Vec::with_capacity(symbols_json.len());
        for symbol in symbols_json {
            let symbol = symbol
                .as_str()
                .ok_or_else(|| SchemaError::invalid(path, "enum symbols must be strings"))?;
            if !is_valid_name(symbol) {
                return Err(SchemaError::invalid(
                    path,
                    format!("invalid enum symbol '{symbol}'"),
                ));
            }
            if symbols.iter().any(|s| s == symbol) {
                return Err(SchemaError::invalid(
                    path,
                    format!("duplicate enum symbol '{symbol}'"),
                ));
            }
            symbols.push(symbol.to_string());
        }

        let default = optional_str(attrs, "default");
        if let Some(default) = &default
            && !symbols.contains(default)
        {
            return Err(SchemaError::invalid(
                path,
                format!("enum default '{default}' is not a symbol"),
            ));
        }

        let schema = Schema::Enum(EnumSchema {
            name: name.clone(),
            doc: optional_str(attrs, "doc"),
            symbols,
            default,
        });
        self.named.insert(name, schema.clone());
        Ok(schema)
    }

    fn parse_fixed(
        &mut self,
        attrs: &Map<String, Json>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Schema, SchemaError> {
        let name = self.define_name(attrs, namespace, path)?;
        let size = attrs
            .get("size")
            .and_then(Json::as_u64)
            .and_then(|size| usize::try_from(size).ok())
            .ok_or_else(|| {
                SchemaError::invalid(path, "fixed 'size' must be a non-negative integer")
            })?;

        let schema = Schema::Fixed(FixedSchema {
            name: name.clone(),
            size,
        });
        self.named.insert(name, schema.clone());
        Ok(schema)
    }

    /// Read, qualify, validate and register the name of a named type.
    fn define_name(
        &mut self,
        attrs: &Map<String, Json>,
        namespace: Option<&str>,
        path: &str,
    ) -> Result<Name, SchemaError> {
        let raw = required_str(attrs, "name", path)?;
        let name = if raw.contains('.') {
            Name::from_fullname(raw)
        } else {
            let ns = match attrs.get("namespace") {
                Some(Json::String(ns)) => Some(ns.clone()),
                Some(Json::Null) | None => namespace.map(str::to_string),
                Some(_) => return Err(SchemaError::invalid(path, "'namespace' must be a string")),
            };
            Name::new(raw, ns)
        };

        let segments_ok = name.name.split('.').all(is_valid_name)
            && name
                .namespace
                .as_deref()
                .is_none_or(|ns| ns.split('.').all(is_valid_name));
        if !segments_ok {
            return Err(SchemaError::invalid(
                path,
                format!("invalid name '{}'", name.fullname()),
            ));
        }
        if primitive(&name.name).is_some() && name.namespace.is_none() {
            return Err(SchemaError::invalid(
                path,
                format!("'{}' is a primitive type name", name.name),
            ));
        }
        if !self.defined.insert(name.clone()) {
            return Err(SchemaError::DuplicateName {
                fullname: name.fullname(),
            });
        }
        Ok(name)
    }
}

pub(crate) fn primitive(type_name: &str) -> Option<Schema> {
    Some(match type_name {
        "null" => Schema::Null,
        "boolean" => Schema::Boolean,
        "int" => Schema::Int,
        "long" => Schema::Long,
        "float" => Schema::Float,
        "double" => Schema::Double,
        "bytes" => Schema::Bytes,
        "string" => Schema::String,
        _ => return None,
    })
}

fn is_valid_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn required_str<'a>(
    attrs: &'a Map<String, Json>,
    key: &str,
    path: &str,
) -> Result<&'a str, SchemaError> {
    attrs
        .get(key)
        .and_then(Json::as_str)
        .ok_or_else(|| SchemaError::invalid(path, format!("missing string attribute '{key}'")))
}

fn optional_str(attrs: &Map<String, Json>, key: &str) -> Option<String> {
    attrs.get(key).and_then(Json::as_str).map(str::to_string)
}

fn string_list(attrs: &Map<String, Json>, key: &str) -> Vec<String> {
    attrs
        .get(key)
        .and_then(Json::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Json::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
