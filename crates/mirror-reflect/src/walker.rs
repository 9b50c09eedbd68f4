//! Struct descriptor walker
//!
//! Turns a struct's static [`StructInfo`](crate::StructInfo) into a
//! [`TypeDescriptor`] and walks field descriptors and field handles in
//! lock-step. Descriptors are built once per concrete type and shared.

use std::any::TypeId;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::descriptor::{FieldDescriptor, TypeDescriptor};
use crate::error::{ReflectError, ReflectResult};
use crate::kind::{classify, Kind};
use crate::reflect::Struct;
use crate::tags::Tags;
use crate::value::Value;

static DESCRIPTORS: Lazy<RwLock<FxHashMap<TypeId, Arc<TypeDescriptor>>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Describe the struct behind `value`.
///
/// Accepts a struct handle or a pointer to one; addressability is not
/// required. Anything else is `NotAStruct`.
pub fn describe(value: &Value<'_>) -> ReflectResult<Arc<TypeDescriptor>> {
    describe_struct(value.struct_view()?)
}

/// Describe a struct reached without a handle
pub fn describe_struct(value: &dyn Struct) -> ReflectResult<Arc<TypeDescriptor>> {
    let type_id = value.as_any().type_id();
    if let Some(cached) = DESCRIPTORS.read().get(&type_id) {
        return Ok(Arc::clone(cached));
    }

    let descriptor = Arc::new(build(value)?);
    let mut cache = DESCRIPTORS.write();
    let entry = cache.entry(type_id).or_insert_with(|| {
        tracing::debug!(
            type_name = %descriptor.name,
            fields = descriptor.fields.len(),
            "cached type descriptor"
        );
        Arc::clone(&descriptor)
    });
    Ok(Arc::clone(entry))
}

fn build(value: &dyn Struct) -> ReflectResult<TypeDescriptor> {
    let info = value.struct_info();
    let fields = info
        .fields()
        .iter()
        .enumerate()
        .map(|(index, field)| {
            let tags = Tags::parse(field.tag()).map_err(|err| ReflectError::MalformedTag {
                field: field.name().to_string(),
                reason: err.to_string(),
            })?;
            let kind = value.field_at(index).map_or(Kind::Unsupported, classify);
            Ok(FieldDescriptor {
                name: field.name().to_string(),
                index,
                kind,
                tags,
                raw_tag: field.tag().to_string(),
            })
        })
        .collect::<ReflectResult<Vec<_>>>()?;

    Ok(TypeDescriptor {
        name: info.name().to_string(),
        fields,
    })
}

/// Field descriptors paired with read-only field handles, in declaration order
pub fn fields<'v>(value: &'v Value<'_>) -> ReflectResult<Vec<(FieldDescriptor, Value<'v>)>> {
    let view = value.struct_view()?;
    let descriptor = describe_struct(view)?;
    let len = view.field_len();
    descriptor
        .fields
        .iter()
        .map(|field| {
            let handle = view
                .field_at(field.index)
                .ok_or(ReflectError::IndexOutOfRange {
                    index: field.index,
                    len,
                })?;
            Ok((field.clone(), Value::of(handle)))
        })
        .collect()
}

/// Field descriptors paired with addressable field handles, in declaration order
pub fn fields_mut<'v>(
    value: &'v mut Value<'_>,
) -> ReflectResult<Vec<(FieldDescriptor, Value<'v>)>> {
    let view = value.struct_view_mut()?;
    let descriptor = describe_struct(&*view)?;
    let handles = view.fields_mut();
    if handles.len() != descriptor.fields.len() {
        return Err(ReflectError::IndexOutOfRange {
            index: descriptor.fields.len(),
            len: handles.len(),
        });
    }
    Ok(descriptor
        .fields
        .iter()
        .cloned()
        .zip(handles.into_iter().map(Value::exclusive))
        .collect())
}
