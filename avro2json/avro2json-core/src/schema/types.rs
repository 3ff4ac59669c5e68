use std::{
    fmt::{self, Display, Formatter},
    ops::Deref,
};

/// Fully qualified name of a named type (`record`, `enum`, `fixed`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub name: String,
    pub namespace: Option<String>,
}

impl Name {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.filter(|ns| !ns.is_empty()),
        }
    }

    /// Split a dotted full name into namespace and simple name.
    pub fn from_fullname(fullname: &str) -> Self {
        match fullname.rsplit_once('.') {
            Some((namespace, name)) => Self::new(name, Some(namespace.to_string())),
            None => Self::new(fullname, None),
        }
    }

    pub fn fullname(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fullname())
    }
}

/// Recursive Avro type descriptor.
///
/// Named types appear in full at their first definition; later uses are
/// [`Schema::Ref`] entries resolved through
/// [`ResolvedSchema`](crate::ResolvedSchema).
#[derive(Debug, Clone, PartialEq)]
pub enum Schema {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record(RecordSchema),
    Enum(EnumSchema),
    Array(Box<Schema>),
    Map(Box<Schema>),
    Union(UnionSchema),
    Fixed(FixedSchema),
    Ref(Name),
}

impl Schema {
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Schema::Null
                | Schema::Boolean
                | Schema::Int
                | Schema::Long
                | Schema::Float
                | Schema::Double
                | Schema::Bytes
                | Schema::String
        )
    }

    /// Name of a named type, or of the type a reference points at.
    pub fn name(&self) -> Option<&Name> {
        match self {
            Schema::Record(r) => Some(&r.name),
            Schema::Enum(e) => Some(&e.name),
            Schema::Fixed(f) => Some(&f.name),
            Schema::Ref(name) => Some(name),
            _ => None,
        }
    }

    /// Avro type tag, as written in schema JSON.
    pub fn type_name(&self) -> &'static str {
        match self {
            Schema::Null => "null",
            Schema::Boolean => "boolean",
            Schema::Int => "int",
            Schema::Long => "long",
            Schema::Float => "float",
            Schema::Double => "double",
            Schema::Bytes => "bytes",
            Schema::String => "string",
            Schema::Record(_) => "record",
            Schema::Enum(_) => "enum",
            Schema::Array(_) => "array",
            Schema::Map(_) => "map",
            Schema::Union(_) => "union",
            Schema::Fixed(_) => "fixed",
            Schema::Ref(_) => "ref",
        }
    }

    /// Key used to label a union branch in JSON: the full name for named
    /// types, the type tag otherwise.
    pub fn branch_name(&self) -> String {
        match self.name() {
            Some(name) => name.fullname(),
            None => self.type_name().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub aliases: Vec<String>,
    pub fields: Vec<RecordField>,
}

impl RecordSchema {
    pub fn field(&self, name: &str) -> Option<&RecordField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    pub name: String,
    pub schema: Schema,
    pub default: Option<serde_json::Value>,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    pub name: Name,
    pub doc: Option<String>,
    pub symbols: Vec<String>,
    pub default: Option<String>,
}

impl EnumSchema {
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FixedSchema {
    pub name: Name,
    pub size: usize,
}

/// Ordered union branches.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnionSchema(pub Vec<Schema>);

impl UnionSchema {
    pub fn new(variants: Vec<Schema>) -> Self {
        Self(variants)
    }

    pub fn variants(&self) -> &[Schema] {
        &self.0
    }

    /// Index of the `null` branch, if any.
    pub fn null_index(&self) -> Option<usize> {
        self.0.iter().position(|s| matches!(s, Schema::Null))
    }
}

impl Deref for UnionSchema {
    type Target = [Schema];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
