//! Error types for reflection, walking and dispatch

use crate::kind::Kind;

/// Result type for reflection operations
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Reflection error types
///
/// Every failing operation reports one of these at the call site. None of
/// them is fatal: a `NotFound` from method resolution in particular is an
/// ordinary negative lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ReflectError {
    /// Operation requested on a value of the wrong kind
    #[error("Kind mismatch: expected {expected}, got {found}")]
    KindMismatch {
        /// Kind the operation needs
        expected: Kind,
        /// Kind of the handle
        found: Kind,
    },

    /// Mutation through a handle that was not obtained through a reference
    #[error("Cannot {operation}: value is not addressable")]
    NotAddressable {
        /// Operation that was refused
        operation: &'static str,
    },

    /// Named method lookup failed
    #[error("Method '{method}' not found on '{type_name}'")]
    NotFound {
        /// Runtime type searched
        type_name: String,
        /// Requested method name
        method: String,
    },

    /// Named field lookup failed
    #[error("Field '{field}' not found on '{type_name}'")]
    FieldNotFound {
        /// Struct searched
        type_name: String,
        /// Requested field name
        field: String,
    },

    /// Wrong number of positional arguments
    #[error("Method '{method}' expects {expected} arguments, got {found}")]
    ArityMismatch {
        /// Invoked method
        method: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// An argument's kind does not match the declared parameter kind
    #[error("Argument {index} of '{method}': expected {expected}, got {found}")]
    ArgumentKindMismatch {
        /// Invoked method
        method: String,
        /// Zero-based argument position
        index: usize,
        /// Declared parameter kind
        expected: Kind,
        /// Supplied argument kind
        found: Kind,
    },

    /// Structural introspection requested on a non-struct value
    #[error("Expected a struct, got {found}")]
    NotAStruct {
        /// Kind that was supplied
        found: Kind,
    },

    /// Field or element index past the end
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of available positions
        len: usize,
    },

    /// Value does not fit the storage width of the target
    #[error("Value {value} overflows {type_name}")]
    Overflow {
        /// Rendered source value
        value: String,
        /// Declared storage type
        type_name: &'static str,
    },

    /// A field's tag string is not a sequence of `key:"value"` pairs
    #[error("Malformed tag on field '{field}': {reason}")]
    MalformedTag {
        /// Field carrying the tag
        field: String,
        /// Parser diagnostic
        reason: String,
    },

    /// Operation not valid for this handle
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl ReflectError {
    /// True for a negative method lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, ReflectError::NotFound { .. })
    }

    pub(crate) fn kind_mismatch(expected: Kind, found: Kind) -> Self {
        ReflectError::KindMismatch { expected, found }
    }
}
