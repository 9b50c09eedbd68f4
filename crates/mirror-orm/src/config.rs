//! Query configuration (query.toml)
//!
//! Every key is optional; the defaults produce the canonical output
//! `SELECT name,id FROM classmodels WHERE name = '...';`.
//!
//! ```toml
//! placeholder = "?"
//! table_suffix = "s"
//! column_separator = ","
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OrmError, OrmResult};

/// Rendering options for the query compiler
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct QueryConfig {
    /// Marker substituted by arguments in a condition template
    pub placeholder: String,

    /// Appended to the lower-cased type name to form the table name
    pub table_suffix: String,

    /// Joins column names and literals
    pub column_separator: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            placeholder: "?".to_string(),
            table_suffix: "s".to_string(),
            column_separator: ",".to_string(),
        }
    }
}

impl QueryConfig {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> OrmResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml_str(content: &str) -> OrmResult<Self> {
        let config: QueryConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string
    pub fn to_toml_string(&self) -> OrmResult<String> {
        toml::to_string(self).map_err(|e| OrmError::InvalidConfig(e.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> OrmResult<()> {
        if self.placeholder.is_empty() {
            return Err(OrmError::InvalidConfig(
                "placeholder cannot be empty".to_string(),
            ));
        }
        if self.column_separator.is_empty() {
            return Err(OrmError::InvalidConfig(
                "column_separator cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
