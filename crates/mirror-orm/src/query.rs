//! Declarative query compiler
//!
//! Builds `SELECT` statements from a [`TypeDescriptor`]: the table name is
//! the lower-cased type name plus a suffix, the columns are the values of
//! one tag key in field order, and an optional condition template has its
//! placeholders replaced by literal arguments left to right.
//!
//! String literals are wrapped in single quotes without escaping. The
//! output is not safe against injection.

use mirror_reflect::{Kind, Reflect, TypeDescriptor, Value};

use crate::config::QueryConfig;
use crate::error::{OrmError, OrmResult};

/// Query compiler carrying its rendering options
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: QueryConfig,
}

impl Compiler {
    /// Create a compiler with the given options
    pub fn new(config: QueryConfig) -> Self {
        Self { config }
    }

    /// Rendering options
    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    /// Table name for a described type
    pub fn table_name(&self, descriptor: &TypeDescriptor) -> String {
        let mut table = descriptor.name.to_lowercase();
        table.push_str(&self.config.table_suffix);
        table
    }

    /// Column names: `tag_key` values in field order, untagged fields skipped
    pub fn columns<'d>(&self, descriptor: &'d TypeDescriptor, tag_key: &str) -> Vec<&'d str> {
        descriptor
            .fields
            .iter()
            .filter_map(|field| field.tag(tag_key))
            .collect()
    }

    /// Compile `SELECT <cols> FROM <table>[ WHERE <cond>];`
    pub fn select(
        &self,
        descriptor: &TypeDescriptor,
        tag_key: &str,
        condition: Option<&str>,
        args: &[&dyn Reflect],
    ) -> OrmResult<String> {
        let columns = self.columns(descriptor, tag_key);
        if columns.is_empty() {
            return Err(OrmError::NoColumns {
                type_name: descriptor.name.clone(),
                tag_key: tag_key.to_string(),
            });
        }

        let mut query = format!(
            "SELECT {} FROM {}",
            columns.join(&self.config.column_separator),
            self.table_name(descriptor)
        );
        // A blank template is no condition at all
        match condition.filter(|template| !template.trim().is_empty()) {
            Some(template) => {
                query.push_str(" WHERE ");
                query.push_str(&self.condition(template, args)?);
            }
            None if !args.is_empty() => {
                return Err(OrmError::ArgumentCountMismatch {
                    placeholders: 0,
                    arguments: args.len(),
                });
            }
            None => {}
        }
        query.push(';');

        tracing::trace!(type_name = %descriptor.name, tag_key, query = %query, "compiled select");
        Ok(query)
    }

    /// Substitute `args` into the placeholders of `template`
    pub fn condition(&self, template: &str, args: &[&dyn Reflect]) -> OrmResult<String> {
        let placeholder = self.config.placeholder.as_str();
        let placeholders = template.matches(placeholder).count();
        if placeholders != args.len() {
            return Err(OrmError::ArgumentCountMismatch {
                placeholders,
                arguments: args.len(),
            });
        }

        let mut rendered = String::with_capacity(template.len());
        let mut pieces = template.split(placeholder);
        if let Some(head) = pieces.next() {
            rendered.push_str(head);
        }
        for (index, (piece, &arg)) in pieces.zip(args).enumerate() {
            rendered.push_str(&literal(index, &Value::of(arg))?);
            rendered.push_str(piece);
        }
        Ok(rendered)
    }
}

/// Render a value as a literal: strings quoted, numerics in decimal
pub fn literal(index: usize, value: &Value<'_>) -> OrmResult<String> {
    match value.kind() {
        Kind::String => Ok(format!("'{}'", value.as_str()?)),
        Kind::Int => Ok(value.as_int()?.to_string()),
        Kind::Uint => Ok(value.as_uint()?.to_string()),
        Kind::Float => float_literal(index, value),
        kind @ (Kind::Bool | Kind::Struct | Kind::Pointer | Kind::Slice | Kind::Unsupported) => {
            Err(OrmError::UnsupportedArgumentKind { index, kind })
        }
    }
}

/// Decimal rendering at the value's own width; NaN and infinities have no literal
fn float_literal(index: usize, value: &Value<'_>) -> OrmResult<String> {
    let wide = value.as_float()?;
    if !wide.is_finite() {
        return Err(OrmError::UnsupportedArgumentKind {
            index,
            kind: Kind::Float,
        });
    }
    match value.downcast_ref::<f32>() {
        Some(single) => Ok(single.to_string()),
        None => Ok(wide.to_string()),
    }
}

/// Compile a `SELECT` with the default options
pub fn compile(
    descriptor: &TypeDescriptor,
    tag_key: &str,
    condition: Option<&str>,
    args: &[&dyn Reflect],
) -> OrmResult<String> {
    Compiler::default().select(descriptor, tag_key, condition, args)
}
