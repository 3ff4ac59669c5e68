use std::collections::HashMap;

use super::{
    parse::Parser,
    types::{Name, Schema},
};
use crate::error::SchemaError;

/// A root schema together with every named type it defines.
///
/// This is the self-contained unit shared by the decoder and the encoders of
/// one stream: [`resolve`](Self::resolve) turns a [`Schema::Ref`] back into
/// its definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    root: Schema,
    named: HashMap<Name, Schema>,
}

impl ResolvedSchema {
    /// Parse a schema from its JSON text form.
    pub fn parse_str(text: &str) -> Result<Self, SchemaError> {
        let json: serde_json::Value = serde_json::from_str(text)?;
        Self::parse_json(&json)
    }

    /// Parse a schema from an already decoded JSON document.
    pub fn parse_json(json: &serde_json::Value) -> Result<Self, SchemaError> {
        let mut parser = Parser::default();
        let root = parser.parse(json, None, "$")?;
        Ok(Self {
            root,
            named: parser.named,
        })
    }

    /// Build from a programmatically constructed schema tree.
    ///
    /// Named definitions are collected from the tree; every [`Schema::Ref`]
    /// must point at one of them.
    pub fn new(root: Schema) -> Result<Self, SchemaError> {
        let mut named = HashMap::new();
        collect_named(&root, &mut named)?;
        check_refs(&root, &named)?;
        Ok(Self { root, named })
    }

    pub fn root(&self) -> &Schema {
        &self.root
    }

    /// Look up a named type by its full name.
    pub fn named(&self, fullname: &str) -> Option<&Schema> {
        self.named.get(&Name::from_fullname(fullname))
    }

    pub fn named_types(&self) -> impl Iterator<Item = (&Name, &Schema)> {
        self.named.iter()
    }

    /// Follow a [`Schema::Ref`] to its definition; other schemas are returned
    /// as-is.
    pub fn resolve<'a>(&'a self, schema: &'a Schema) -> Result<&'a Schema, SchemaError> {
        match schema {
            Schema::Ref(name) => {
                self.named
                    .get(name)
                    .ok_or_else(|| SchemaError::UndefinedName {
                        fullname: name.fullname(),
                    })
            }
            other => Ok(other),
        }
    }
}

fn collect_named(schema: &Schema, named: &mut HashMap<Name, Schema>) -> Result<(), SchemaError> {
    if let Some(name) = schema.name()
        && !matches!(schema, Schema::Ref(_))
        && named.insert(name.clone(), schema.clone()).is_some()
    {
        return Err(SchemaError::DuplicateName {
            fullname: name.fullname(),
        });
    }

    match schema {
        Schema::Record(record) => {
            for field in &record.fields {
                collect_named(&field.schema, named)?;
            }
        }
        Schema::Array(items) => collect_named(items, named)?,
        Schema::Map(values) => collect_named(values, named)?,
        Schema::Union(union) => {
            for variant in union.variants() {
                collect_named(variant, named)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_refs(schema: &Schema, named: &HashMap<Name, Schema>) -> Result<(), SchemaError> {
    match schema {
        Schema::Ref(name) if !named.contains_key(name) => Err(SchemaError::UndefinedName {
            fullname: name.fullname(),
        }),
        Schema::Record(record) => record
            .fields
            .iter()
            .try_for_each(|field| check_refs(&field.schema, named)),
        Schema::Array(items) => check_refs(items, named),
        Schema::Map(values) => check_refs(values, named),
        Schema::Union(union) => union
            .variants()
            .iter()
            .try_for_each(|variant| check_refs(variant, named)),
        _ => Ok(()),
    }
}
