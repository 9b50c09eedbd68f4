//! Struct side tables and descriptors
//!
//! [`StructInfo`] is the static, per-type table emitted by
//! `#[derive(Reflect)]`: the declared type name plus, for every field in
//! declaration order, its name and raw tag string. The walker turns it into
//! a [`TypeDescriptor`], which adds each field's [`Kind`] and parsed [`Tags`].

use crate::kind::Kind;
use crate::tags::Tags;

/// Static metadata for one declared field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    name: &'static str,
    tag: &'static str,
}

impl FieldInfo {
    /// Field with a raw tag string (empty when untagged)
    pub const fn new(name: &'static str, tag: &'static str) -> Self {
        Self { name, tag }
    }

    /// Declared field name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Raw tag string
    pub fn tag(&self) -> &'static str {
        self.tag
    }
}

/// Static metadata for a struct type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructInfo {
    name: &'static str,
    fields: &'static [FieldInfo],
}

impl StructInfo {
    /// Build from a type name and its fields in declaration order
    pub const fn new(name: &'static str, fields: &'static [FieldInfo]) -> Self {
        Self { name, fields }
    }

    /// Declared type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &'static [FieldInfo] {
        self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a struct without fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declaration position of the field called `name`
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Descriptor for one field: name, kind and tag mapping
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared field name
    pub name: String,
    /// Declaration position
    pub index: usize,
    /// Kind of the field's type
    pub kind: Kind,
    /// Parsed tags
    pub tags: Tags,
    /// Tag string as declared
    pub raw_tag: String,
}

impl FieldDescriptor {
    /// Tag value for `key`, `None` when not tagged with it
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key)
    }
}

/// Descriptor for a struct type: name plus ordered fields
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// Declared type name
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<FieldDescriptor>,
}

impl TypeDescriptor {
    /// Field descriptor by name
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True for a struct without fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
