//! Error types for query compilation and row mapping

use mirror_reflect::{Kind, ReflectError};
use thiserror::Error;

/// Result type for mapping operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Errors that can occur while compiling queries or mapping rows
#[derive(Debug, Error)]
pub enum OrmError {
    /// Placeholder count in the condition differs from the argument count
    #[error("Condition has {placeholders} placeholders but {arguments} arguments were supplied")]
    ArgumentCountMismatch {
        /// Placeholder markers found in the template
        placeholders: usize,
        /// Arguments supplied
        arguments: usize,
    },

    /// A value cannot be rendered as a literal
    #[error("Argument {index} has unsupported kind {kind}")]
    UnsupportedArgumentKind {
        /// Position of the offending value
        index: usize,
        /// Its kind
        kind: Kind,
    },

    /// No field carries the requested tag key
    #[error("Type '{type_name}' has no columns tagged '{tag_key}'")]
    NoColumns {
        /// Described type
        type_name: String,
        /// Tag key used for column names
        tag_key: String,
    },

    /// A row column does not match any tagged field
    #[error("Column '{column}' does not map to a field of '{type_name}'")]
    UnknownColumn {
        /// Column name from the row
        column: String,
        /// Target type
        type_name: String,
    },

    /// Failure in the reflection layer
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// Failed to read a configuration file
    #[error("Failed to read query config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse query config: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but is unusable
    #[error("Invalid query config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = OrmError::ArgumentCountMismatch {
            placeholders: 2,
            arguments: 1,
        };
        assert_eq!(
            err.to_string(),
            "Condition has 2 placeholders but 1 arguments were supplied"
        );

        let err = OrmError::UnsupportedArgumentKind {
            index: 0,
            kind: Kind::Bool,
        };
        assert_eq!(err.to_string(), "Argument 0 has unsupported kind bool");
    }

    #[test]
    fn test_reflect_errors_convert() {
        let err: OrmError = ReflectError::NotAStruct { found: Kind::Int }.into();
        assert!(matches!(
            err,
            OrmError::Reflect(ReflectError::NotAStruct { found: Kind::Int })
        ));
        assert_eq!(err.to_string(), "Expected a struct, got int");
    }
}
