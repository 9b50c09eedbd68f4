//! Kind classification
//!
//! Every reflectable value maps to exactly one [`Kind`]. The kind is the
//! dispatch key for the accessor, the walker and the dispatcher; branches
//! over it always carry an explicit `Unsupported` arm.

use std::fmt;

use crate::reflect::{Reflect, ReflectMut, ReflectRef};

/// Closed classification of a value's underlying shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Owned UTF-8 string
    String,
    /// Signed integer of any width
    Int,
    /// Unsigned integer of any width
    Uint,
    /// Boolean
    Bool,
    /// Floating point number of any width
    Float,
    /// Structured value with named fields
    Struct,
    /// Reference or owning pointer to another value
    Pointer,
    /// Homogeneous sequence
    Slice,
    /// Anything the toolkit does not model
    Unsupported,
}

impl Kind {
    /// Lower-case name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Bool => "bool",
            Kind::Float => "float",
            Kind::Struct => "struct",
            Kind::Pointer => "pointer",
            Kind::Slice => "slice",
            Kind::Unsupported => "unsupported",
        }
    }

    /// Int or Uint
    pub fn is_integer(self) -> bool {
        matches!(self, Kind::Int | Kind::Uint)
    }

    /// Int, Uint or Float
    pub fn is_numeric(self) -> bool {
        matches!(self, Kind::Int | Kind::Uint | Kind::Float)
    }

    /// Kinds that hold a single primitive value
    pub fn is_scalar(self) -> bool {
        match self {
            Kind::String | Kind::Int | Kind::Uint | Kind::Bool | Kind::Float => true,
            Kind::Struct | Kind::Pointer | Kind::Slice | Kind::Unsupported => false,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify a value.
///
/// Total and side-effect free: shapes the toolkit does not model classify as
/// [`Kind::Unsupported`].
pub fn classify(value: &dyn Reflect) -> Kind {
    value.reflect_ref().kind()
}

impl ReflectRef<'_> {
    /// Kind of the viewed value
    pub fn kind(&self) -> Kind {
        match self {
            ReflectRef::String(_) => Kind::String,
            ReflectRef::Int(_) => Kind::Int,
            ReflectRef::Uint(_) => Kind::Uint,
            ReflectRef::Bool(_) => Kind::Bool,
            ReflectRef::Float(_) => Kind::Float,
            ReflectRef::Struct(_) => Kind::Struct,
            ReflectRef::Pointer(_) => Kind::Pointer,
            ReflectRef::Slice(_) => Kind::Slice,
            ReflectRef::Unsupported => Kind::Unsupported,
        }
    }
}

impl ReflectMut<'_> {
    /// Kind of the viewed value
    pub fn kind(&self) -> Kind {
        match self {
            ReflectMut::String(_) => Kind::String,
            ReflectMut::Int(_) => Kind::Int,
            ReflectMut::Uint(_) => Kind::Uint,
            ReflectMut::Bool(_) => Kind::Bool,
            ReflectMut::Float(_) => Kind::Float,
            ReflectMut::Struct(_) => Kind::Struct,
            ReflectMut::Pointer(_) => Kind::Pointer,
            ReflectMut::Slice(_) => Kind::Slice,
            ReflectMut::Unsupported => Kind::Unsupported,
        }
    }
}
