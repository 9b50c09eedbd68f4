//! Row mapping
//!
//! Moves values between tagged struct fields and flat rows: `INSERT`
//! statements are rendered from a value's tagged fields, and a row of
//! `(column, value)` pairs can be written back into an addressable value.

use mirror_reflect::{describe, fields, fields_mut, Kind, Reflect, ReflectError, Value};

use crate::error::{OrmError, OrmResult};
use crate::query::{literal, Compiler};

impl Compiler {
    /// Compile `INSERT INTO <table> (<cols>) VALUES (<literals>);`
    pub fn insert(&self, value: &Value<'_>, tag_key: &str) -> OrmResult<String> {
        let descriptor = describe(value)?;
        let mut columns = Vec::new();
        let mut literals = Vec::new();
        for (field, handle) in fields(value)? {
            if let Some(column) = field.tag(tag_key) {
                columns.push(column.to_string());
                literals.push(literal(field.index, &handle)?);
            }
        }
        if columns.is_empty() {
            return Err(OrmError::NoColumns {
                type_name: descriptor.name.clone(),
                tag_key: tag_key.to_string(),
            });
        }

        let separator = &self.config().column_separator;
        let query = format!(
            "INSERT INTO {} ({}) VALUES ({});",
            self.table_name(&descriptor),
            columns.join(separator),
            literals.join(separator)
        );
        tracing::trace!(type_name = %descriptor.name, tag_key, query = %query, "compiled insert");
        Ok(query)
    }
}

/// Compile an `INSERT` for `value` with the default options
pub fn compile_insert(value: &Value<'_>, tag_key: &str) -> OrmResult<String> {
    Compiler::default().insert(value, tag_key)
}

/// Assign each `(column, value)` of `row` to the field tagged with that column.
///
/// Columns, kinds and storage widths are checked before any field is written.
pub fn populate(value: &mut Value<'_>, tag_key: &str, row: &[(&str, &dyn Reflect)]) -> OrmResult<()> {
    let descriptor = describe(value)?;
    let mut targets = Vec::with_capacity(row.len());
    {
        let current = fields(value)?;
        for &(column, source) in row {
            let (field, target) = current
                .iter()
                .find(|(field, _)| field.tag(tag_key) == Some(column))
                .ok_or_else(|| OrmError::UnknownColumn {
                    column: column.to_string(),
                    type_name: descriptor.name.clone(),
                })?;
            let source = Value::of(source);
            if source.kind() != field.kind {
                return Err(ReflectError::KindMismatch {
                    expected: field.kind,
                    found: source.kind(),
                }
                .into());
            }
            check_width(target, &source)?;
            targets.push((field.index, source));
        }
    }

    let mut handles = fields_mut(value)?;
    for (index, source) in &targets {
        handles[*index].1.set(source)?;
    }
    tracing::trace!(
        type_name = %descriptor.name,
        columns = targets.len(),
        "populated value from row"
    );
    Ok(())
}

/// Refuse a numeric source that would overflow the target's storage
fn check_width(target: &Value<'_>, source: &Value<'_>) -> OrmResult<()> {
    let (overflows, rendered) = match source.kind() {
        Kind::Int => {
            let wide = source.as_int()?;
            (target.overflows_int(wide)?, wide.to_string())
        }
        Kind::Uint => {
            let wide = source.as_uint()?;
            (target.overflows_uint(wide)?, wide.to_string())
        }
        Kind::Float => {
            let wide = source.as_float()?;
            (target.overflows_float(wide)?, wide.to_string())
        }
        Kind::String | Kind::Bool | Kind::Struct | Kind::Pointer | Kind::Slice | Kind::Unsupported => {
            return Ok(())
        }
    };
    if overflows {
        return Err(ReflectError::Overflow {
            value: rendered,
            type_name: target.type_name(),
        }
        .into());
    }
    Ok(())
}
