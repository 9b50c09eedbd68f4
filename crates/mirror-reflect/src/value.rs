//! Value handles
//!
//! A [`Value`] wraps a borrow of caller storage together with the [`Kind`]
//! it had when the handle was created. The handle owns nothing.
//!
//! Mutability follows addressability:
//!
//! - [`Value::of`] takes a shared borrow and yields a read-only copy handle
//! - [`Value::of_mut`] yields a `Pointer` handle referring to the storage
//! - [`Value::dereference`] on such a handle yields an addressable handle on
//!   the storage itself, which setters may write through
//!
//! Every refused operation is reported as a [`ReflectError`]; nothing is
//! coerced.

use std::fmt;

use crate::error::{ReflectError, ReflectResult};
use crate::kind::{classify, Kind};
use crate::reflect::{f32_fits, List, Reflect, ReflectMut, ReflectRef, Struct};

enum Slot<'a> {
    /// Read-only borrow of the value
    Shared(&'a dyn Reflect),
    /// Exclusive borrow of the value itself
    Exclusive(&'a mut dyn Reflect),
    /// Exclusive borrow seen as a pointer to the value
    Indirect(&'a mut dyn Reflect),
}

/// Handle on a reflectable value
pub struct Value<'a> {
    slot: Slot<'a>,
    kind: Kind,
}

impl<'a> Value<'a> {
    /// Read-only handle on `value`
    pub fn of(value: &'a dyn Reflect) -> Self {
        Self {
            kind: classify(value),
            slot: Slot::Shared(value),
        }
    }

    /// `Pointer` handle referring to `value`
    pub fn of_mut(value: &'a mut dyn Reflect) -> Self {
        Self {
            slot: Slot::Indirect(value),
            kind: Kind::Pointer,
        }
    }

    /// Addressable handle on `value`; same as `Value::of_mut(value).dereference()`
    pub fn addressable(value: &'a mut dyn Reflect) -> Self {
        Self::exclusive(value)
    }

    pub(crate) fn exclusive(value: &'a mut dyn Reflect) -> Self {
        let kind = classify(&*value);
        Self {
            slot: Slot::Exclusive(value),
            kind,
        }
    }

    /// Follow a `Pointer` handle to the value it refers to.
    ///
    /// The result is addressable. A `Box` reached through a read-only handle
    /// cannot be written through and reports `NotAddressable`.
    pub fn dereference(self) -> ReflectResult<Value<'a>> {
        if self.kind != Kind::Pointer {
            return Err(ReflectError::InvalidOperation(format!(
                "cannot dereference a {} value",
                self.kind
            )));
        }
        match self.slot {
            Slot::Indirect(target) => Ok(Value::exclusive(target)),
            Slot::Exclusive(target) => match target.reflect_mut() {
                ReflectMut::Pointer(pointee) => Ok(Value::exclusive(pointee)),
                other => Err(ReflectError::kind_mismatch(Kind::Pointer, other.kind())),
            },
            Slot::Shared(_) => Err(ReflectError::NotAddressable {
                operation: "dereference",
            }),
        }
    }

    /// Consume a struct handle, keeping the field at `index`.
    ///
    /// The field inherits the handle's addressability.
    pub fn into_field(self, index: usize) -> ReflectResult<Value<'a>> {
        let found = self.kind;
        match self.slot {
            Slot::Shared(target) => match target.reflect_ref() {
                ReflectRef::Struct(fields) => {
                    let len = fields.field_len();
                    fields
                        .field_at(index)
                        .map(Value::of)
                        .ok_or(ReflectError::IndexOutOfRange { index, len })
                }
                _ => Err(ReflectError::kind_mismatch(Kind::Struct, found)),
            },
            Slot::Exclusive(target) => match target.reflect_mut() {
                ReflectMut::Struct(fields) => {
                    let len = fields.field_len();
                    fields
                        .field_at_mut(index)
                        .map(Value::exclusive)
                        .ok_or(ReflectError::IndexOutOfRange { index, len })
                }
                _ => Err(ReflectError::kind_mismatch(Kind::Struct, found)),
            },
            Slot::Indirect(_) => Err(ReflectError::kind_mismatch(Kind::Struct, found)),
        }
    }
}

impl Value<'_> {
    /// Kind fixed at creation
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Declared name of the referenced value's type
    pub fn type_name(&self) -> &'static str {
        self.as_reflect().type_name()
    }

    /// Whether the handle refers to caller storage it may write through
    pub fn is_addressable(&self) -> bool {
        !matches!(self.slot, Slot::Shared(_))
    }

    /// Always equal to [`Value::is_addressable`]
    pub fn is_mutable(&self) -> bool {
        self.is_addressable()
    }

    /// The referenced value
    pub fn as_reflect(&self) -> &dyn Reflect {
        match &self.slot {
            Slot::Shared(target) => *target,
            Slot::Exclusive(target) | Slot::Indirect(target) => &**target,
        }
    }

    /// Downcast the referenced value to its concrete type
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_reflect().as_any().downcast_ref::<T>()
    }

    fn view(&self) -> ReflectRef<'_> {
        match &self.slot {
            Slot::Shared(target) => target.reflect_ref(),
            Slot::Exclusive(target) => target.reflect_ref(),
            Slot::Indirect(target) => ReflectRef::Pointer(&**target),
        }
    }

    fn view_mut(&mut self, operation: &'static str) -> ReflectResult<ReflectMut<'_>> {
        match &mut self.slot {
            Slot::Exclusive(target) => Ok(target.reflect_mut()),
            Slot::Indirect(target) => Ok(ReflectMut::Pointer(&mut **target)),
            Slot::Shared(_) => Err(ReflectError::NotAddressable { operation }),
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// String contents
    pub fn as_str(&self) -> ReflectResult<&str> {
        match self.view() {
            ReflectRef::String(value) => Ok(value),
            other => Err(ReflectError::kind_mismatch(Kind::String, other.kind())),
        }
    }

    /// Signed integer, widened to `i64`
    pub fn as_int(&self) -> ReflectResult<i64> {
        match self.view() {
            ReflectRef::Int(value) => Ok(value),
            other => Err(ReflectError::kind_mismatch(Kind::Int, other.kind())),
        }
    }

    /// Unsigned integer, widened to `u64`
    pub fn as_uint(&self) -> ReflectResult<u64> {
        match self.view() {
            ReflectRef::Uint(value) => Ok(value),
            other => Err(ReflectError::kind_mismatch(Kind::Uint, other.kind())),
        }
    }

    /// Boolean
    pub fn as_bool(&self) -> ReflectResult<bool> {
        match self.view() {
            ReflectRef::Bool(value) => Ok(value),
            other => Err(ReflectError::kind_mismatch(Kind::Bool, other.kind())),
        }
    }

    /// Float, widened to `f64`
    pub fn as_float(&self) -> ReflectResult<f64> {
        match self.view() {
            ReflectRef::Float(value) => Ok(value),
            other => Err(ReflectError::kind_mismatch(Kind::Float, other.kind())),
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Replace the string contents in place
    pub fn set_string(&mut self, value: &str) -> ReflectResult<()> {
        let found = self.kind;
        match self.view_mut("set_string")? {
            ReflectMut::String(slot) => {
                slot.clear();
                slot.push_str(value);
                Ok(())
            }
            _ => Err(ReflectError::kind_mismatch(Kind::String, found)),
        }
    }

    /// Store a signed integer; values outside the declared width are refused
    pub fn set_int(&mut self, value: i64) -> ReflectResult<()> {
        let found = self.kind;
        match self.view_mut("set_int")? {
            ReflectMut::Int(slot) => {
                let type_name = slot.type_name();
                if slot.store(value) {
                    Ok(())
                } else {
                    Err(ReflectError::Overflow {
                        value: value.to_string(),
                        type_name,
                    })
                }
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Int, found)),
        }
    }

    /// Store an unsigned integer; values outside the declared width are refused
    pub fn set_uint(&mut self, value: u64) -> ReflectResult<()> {
        let found = self.kind;
        match self.view_mut("set_uint")? {
            ReflectMut::Uint(slot) => {
                let type_name = slot.type_name();
                if slot.store(value) {
                    Ok(())
                } else {
                    Err(ReflectError::Overflow {
                        value: value.to_string(),
                        type_name,
                    })
                }
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Uint, found)),
        }
    }

    /// Store a boolean
    pub fn set_bool(&mut self, value: bool) -> ReflectResult<()> {
        let found = self.kind;
        match self.view_mut("set_bool")? {
            ReflectMut::Bool(slot) => {
                *slot = value;
                Ok(())
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Bool, found)),
        }
    }

    /// Store a float; finite values beyond `f32::MAX` are refused for `f32`
    pub fn set_float(&mut self, value: f64) -> ReflectResult<()> {
        let found = self.kind;
        match self.view_mut("set_float")? {
            ReflectMut::Float(slot) => {
                let type_name = slot.type_name();
                if slot.store(value) {
                    Ok(())
                } else {
                    Err(ReflectError::Overflow {
                        value: value.to_string(),
                        type_name,
                    })
                }
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Float, found)),
        }
    }

    /// Assign the contents of another scalar handle of the same kind
    pub fn set(&mut self, source: &Value<'_>) -> ReflectResult<()> {
        if !self.is_mutable() {
            return Err(ReflectError::NotAddressable { operation: "set" });
        }
        if source.kind != self.kind {
            return Err(ReflectError::kind_mismatch(self.kind, source.kind));
        }
        match source.view() {
            ReflectRef::String(value) => self.set_string(value),
            ReflectRef::Int(value) => self.set_int(value),
            ReflectRef::Uint(value) => self.set_uint(value),
            ReflectRef::Bool(value) => self.set_bool(value),
            ReflectRef::Float(value) => self.set_float(value),
            ReflectRef::Struct(_)
            | ReflectRef::Pointer(_)
            | ReflectRef::Slice(_)
            | ReflectRef::Unsupported => Err(ReflectError::InvalidOperation(format!(
                "cannot assign {} values",
                self.kind
            ))),
        }
    }

    /// Whether `value` would overflow this `Int` handle's declared width
    pub fn overflows_int(&self, value: i64) -> ReflectResult<bool> {
        match self.view() {
            ReflectRef::Int(_) => Ok(!int_fits(self.as_reflect(), value)),
            other => Err(ReflectError::kind_mismatch(Kind::Int, other.kind())),
        }
    }

    /// Whether `value` would overflow this `Uint` handle's declared width
    pub fn overflows_uint(&self, value: u64) -> ReflectResult<bool> {
        match self.view() {
            ReflectRef::Uint(_) => Ok(!uint_fits(self.as_reflect(), value)),
            other => Err(ReflectError::kind_mismatch(Kind::Uint, other.kind())),
        }
    }

    /// Whether `value` would overflow this `Float` handle's declared width
    pub fn overflows_float(&self, value: f64) -> ReflectResult<bool> {
        match self.view() {
            ReflectRef::Float(_) => {
                let narrow = self.as_reflect().as_any().is::<f32>();
                Ok(narrow && !f32_fits(value))
            }
            other => Err(ReflectError::kind_mismatch(Kind::Float, other.kind())),
        }
    }

    // ========================================================================
    // Struct access
    // ========================================================================

    fn as_struct(&self) -> ReflectResult<&dyn Struct> {
        match self.view() {
            ReflectRef::Struct(fields) => Ok(fields),
            other => Err(ReflectError::kind_mismatch(Kind::Struct, other.kind())),
        }
    }

    /// Number of fields of a struct handle
    pub fn num_field(&self) -> ReflectResult<usize> {
        Ok(self.as_struct()?.field_len())
    }

    /// Read-only handle on the field at `index`
    pub fn field(&self, index: usize) -> ReflectResult<Value<'_>> {
        let fields = self.as_struct()?;
        let len = fields.field_len();
        fields
            .field_at(index)
            .map(Value::of)
            .ok_or(ReflectError::IndexOutOfRange { index, len })
    }

    /// Addressable handle on the field at `index`
    pub fn field_mut(&mut self, index: usize) -> ReflectResult<Value<'_>> {
        let found = self.kind;
        match self.view_mut("field_mut")? {
            ReflectMut::Struct(fields) => {
                let len = fields.field_len();
                fields
                    .field_at_mut(index)
                    .map(Value::exclusive)
                    .ok_or(ReflectError::IndexOutOfRange { index, len })
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Struct, found)),
        }
    }

    /// Read-only handle on the field called `name`
    pub fn field_by_name(&self, name: &str) -> ReflectResult<Value<'_>> {
        let index = field_index(self.as_struct()?, name)?;
        self.field(index)
    }

    /// Addressable handle on the field called `name`
    pub fn field_by_name_mut(&mut self, name: &str) -> ReflectResult<Value<'_>> {
        let index = field_index(self.as_struct()?, name)?;
        self.field_mut(index)
    }

    // ========================================================================
    // Slice access
    // ========================================================================

    fn as_list(&self) -> ReflectResult<&dyn List> {
        match self.view() {
            ReflectRef::Slice(items) => Ok(items),
            other => Err(ReflectError::kind_mismatch(Kind::Slice, other.kind())),
        }
    }

    /// Number of elements of a slice handle
    pub fn len(&self) -> ReflectResult<usize> {
        Ok(self.as_list()?.len())
    }

    /// True for a slice handle without elements
    pub fn is_empty(&self) -> ReflectResult<bool> {
        Ok(self.as_list()?.is_empty())
    }

    /// Read-only handle on the element at `index`
    pub fn index(&self, index: usize) -> ReflectResult<Value<'_>> {
        let items = self.as_list()?;
        let len = items.len();
        items
            .get(index)
            .map(Value::of)
            .ok_or(ReflectError::IndexOutOfRange { index, len })
    }

    /// Addressable handle on the element at `index`
    pub fn index_mut(&mut self, index: usize) -> ReflectResult<Value<'_>> {
        let found = self.kind;
        match self.view_mut("index_mut")? {
            ReflectMut::Slice(items) => {
                let len = items.len();
                items
                    .get_mut(index)
                    .map(Value::exclusive)
                    .ok_or(ReflectError::IndexOutOfRange { index, len })
            }
            _ => Err(ReflectError::kind_mismatch(Kind::Slice, found)),
        }
    }

    // ========================================================================
    // Pointer normalization
    // ========================================================================

    /// Struct view, following pointers without requiring addressability
    pub(crate) fn struct_view(&self) -> ReflectResult<&dyn Struct> {
        let mut view = self.view();
        loop {
            view = match view {
                ReflectRef::Struct(fields) => return Ok(fields),
                ReflectRef::Pointer(inner) => inner.reflect_ref(),
                other => return Err(ReflectError::NotAStruct { found: other.kind() }),
            };
        }
    }

    /// Exclusive struct view, following pointers
    pub(crate) fn struct_view_mut(&mut self) -> ReflectResult<&mut dyn Struct> {
        let mut view = self.view_mut("fields_mut")?;
        loop {
            view = match view {
                ReflectMut::Struct(fields) => return Ok(fields),
                ReflectMut::Pointer(inner) => inner.reflect_mut(),
                other => return Err(ReflectError::NotAStruct { found: other.kind() }),
            };
        }
    }

    /// The value at the end of any pointer chain
    pub(crate) fn pointee(&self) -> &dyn Reflect {
        let mut current = self.as_reflect();
        while let ReflectRef::Pointer(inner) = current.reflect_ref() {
            current = inner;
        }
        current
    }

    /// Exclusive access to the value at the end of any pointer chain
    pub(crate) fn pointee_mut(&mut self, operation: &'static str) -> ReflectResult<&mut dyn Reflect> {
        let mut current: &mut dyn Reflect = match &mut self.slot {
            Slot::Exclusive(target) | Slot::Indirect(target) => &mut **target,
            Slot::Shared(_) => return Err(ReflectError::NotAddressable { operation }),
        };
        while matches!(current.reflect_ref(), ReflectRef::Pointer(_)) {
            current = match current.reflect_mut() {
                ReflectMut::Pointer(inner) => inner,
                other => return Err(ReflectError::kind_mismatch(Kind::Pointer, other.kind())),
            };
        }
        Ok(current)
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type_name", &self.type_name())
            .field("kind", &self.kind)
            .field("addressable", &self.is_addressable())
            .finish()
    }
}

fn field_index(fields: &dyn Struct, name: &str) -> ReflectResult<usize> {
    let info = fields.struct_info();
    info.field_index(name)
        .ok_or_else(|| ReflectError::FieldNotFound {
            type_name: info.name().to_string(),
            field: name.to_string(),
        })
}

macro_rules! width_probe {
    ($name:ident, $wide:ty, [$($ty:ty),*]) => {
        fn $name(target: &dyn Reflect, value: $wide) -> bool {
            let any = target.as_any();
            $(
                if any.is::<$ty>() {
                    return <$ty>::try_from(value).is_ok();
                }
            )*
            true
        }
    };
}

width_probe!(int_fits, i64, [i8, i16, i32, i64, isize]);
width_probe!(uint_fits, u64, [u8, u16, u32, u64, usize]);
