//! Per-type method tables
//!
//! A [`MethodTable`] maps operation names to type-erased bodies. Each entry
//! records its receiver form and the ordered kinds of its parameters, so the
//! dispatcher can check a call before running it.
//!
//! Tables are built once per type, usually by `#[reflect_methods]`:
//!
//! ```ignore
//! #[reflect_methods]
//! impl Person {
//!     #[reflect(name = "SayHi")]
//!     pub fn say_hi(&self, msg: String) { /* ... */ }
//!
//!     #[reflect(name = "SayBye")]
//!     pub fn say_bye(&mut self, msg: String) { /* ... */ }
//! }
//! ```
//!
//! or by hand with [`MethodTable::builder`].

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use rustc_hash::FxHashMap;

use crate::error::{ReflectError, ReflectResult};
use crate::kind::Kind;
use crate::reflect::Reflect;
use crate::value::Value;

/// Receiver form of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Receiver {
    /// Operates on a shared view of the object (`&self`)
    ByValue,
    /// Operates on the object in place (`&mut self`); requires addressability
    ByReference,
}

/// Name, receiver form and parameter kinds of one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    /// Operation name used for lookup
    pub name: String,
    /// Receiver form
    pub receiver: Receiver,
    /// Parameter kinds in positional order
    pub params: Vec<Kind>,
}

/// What an operation returns to the caller, if anything
pub type Returned = Option<Box<dyn Reflect>>;

type ByValueBody = Box<dyn Fn(&dyn Any, &[Value<'_>]) -> ReflectResult<Returned> + Send + Sync>;
type ByReferenceBody =
    Box<dyn Fn(&mut dyn Any, &[Value<'_>]) -> ReflectResult<Returned> + Send + Sync>;

enum Body {
    ByValue(ByValueBody),
    ByReference(ByReferenceBody),
}

/// One registered operation
pub struct MethodEntry {
    descriptor: MethodDescriptor,
    body: Body,
}

impl MethodEntry {
    /// Descriptor of the operation
    pub fn descriptor(&self) -> &MethodDescriptor {
        &self.descriptor
    }

    /// Operation name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Receiver form
    pub fn receiver(&self) -> Receiver {
        self.descriptor.receiver
    }

    /// Run a by-value body against a shared receiver
    pub(crate) fn call_shared(&self, this: &dyn Any, args: &[Value<'_>]) -> ReflectResult<Returned> {
        match &self.body {
            Body::ByValue(body) => body(this, args),
            Body::ByReference(_) => Err(ReflectError::NotAddressable {
                operation: "call a by-reference method",
            }),
        }
    }

    /// Run either body form against an exclusive receiver
    pub(crate) fn call_exclusive(
        &self,
        this: &mut dyn Any,
        args: &[Value<'_>],
    ) -> ReflectResult<Returned> {
        match &self.body {
            Body::ByValue(body) => body(&*this, args),
            Body::ByReference(body) => body(this, args),
        }
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodEntry")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Name-indexed operations of one type
#[derive(Debug)]
pub struct MethodTable {
    type_name: &'static str,
    entries: Vec<MethodEntry>,
    lookup: FxHashMap<String, usize>,
}

impl MethodTable {
    /// Start a table for receivers of type `T`
    pub fn builder<T: Reflect>(type_name: &'static str) -> MethodTableBuilder<T> {
        MethodTableBuilder {
            table: MethodTable {
                type_name,
                entries: Vec::new(),
                lookup: FxHashMap::default(),
            },
            _receiver: PhantomData,
        }
    }

    /// Name of the receiver type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Entry registered under `name`
    pub fn get(&self, name: &str) -> Option<&MethodEntry> {
        self.lookup.get(name).map(|&index| &self.entries[index])
    }

    /// Check if an operation is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Entries in registration order
    pub fn entries(&self) -> &[MethodEntry] {
        &self.entries
    }

    /// Descriptors in registration order
    pub fn descriptors(&self) -> impl Iterator<Item = &MethodDescriptor> {
        self.entries.iter().map(MethodEntry::descriptor)
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True for a table without operations
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for a [`MethodTable`] whose receivers are `T`
pub struct MethodTableBuilder<T> {
    table: MethodTable,
    _receiver: PhantomData<fn() -> T>,
}

impl<T: Reflect> MethodTableBuilder<T> {
    /// Register an operation taking `&T`
    pub fn by_value<F, R>(self, name: &str, params: &[Kind], body: F) -> Self
    where
        F: Fn(&T, &[Value<'_>]) -> ReflectResult<R> + Send + Sync + 'static,
        R: IntoReturn,
    {
        let method = name.to_string();
        let erased = by_value_body(move |this, args| {
            let this = this
                .downcast_ref::<T>()
                .ok_or_else(|| receiver_mismatch::<T>(&method))?;
            body(this, args).map(IntoReturn::into_return)
        });
        self.push(name, Receiver::ByValue, params, Body::ByValue(erased))
    }

    /// Register an operation taking `&mut T`
    pub fn by_reference<F, R>(self, name: &str, params: &[Kind], body: F) -> Self
    where
        F: Fn(&mut T, &[Value<'_>]) -> ReflectResult<R> + Send + Sync + 'static,
        R: IntoReturn,
    {
        let method = name.to_string();
        let erased = by_reference_body(move |this, args| {
            let this = this
                .downcast_mut::<T>()
                .ok_or_else(|| receiver_mismatch::<T>(&method))?;
            body(this, args).map(IntoReturn::into_return)
        });
        self.push(name, Receiver::ByReference, params, Body::ByReference(erased))
    }

    fn push(mut self, name: &str, receiver: Receiver, params: &[Kind], body: Body) -> Self {
        if self.table.lookup.contains_key(name) {
            tracing::warn!(
                type_name = self.table.type_name,
                method = name,
                "duplicate method registration ignored"
            );
            return self;
        }
        let index = self.table.entries.len();
        self.table.lookup.insert(name.to_string(), index);
        self.table.entries.push(MethodEntry {
            descriptor: MethodDescriptor {
                name: name.to_string(),
                receiver,
                params: params.to_vec(),
            },
            body,
        });
        self
    }

    /// Finish the table
    pub fn build(self) -> MethodTable {
        self.table
    }
}

fn by_value_body<F>(body: F) -> ByValueBody
where
    F: Fn(&dyn Any, &[Value<'_>]) -> ReflectResult<Returned> + Send + Sync + 'static,
{
    Box::new(body)
}

fn by_reference_body<F>(body: F) -> ByReferenceBody
where
    F: Fn(&mut dyn Any, &[Value<'_>]) -> ReflectResult<Returned> + Send + Sync + 'static,
{
    Box::new(body)
}

fn receiver_mismatch<T>(method: &str) -> ReflectError {
    ReflectError::InvalidOperation(format!(
        "receiver of '{}' is not a {}",
        method,
        std::any::type_name::<T>()
    ))
}

/// Types that carry a method table
///
/// Implemented by `#[reflect_methods]`.
pub trait Methods {
    /// The type's table, built on first use
    fn methods() -> &'static MethodTable;
}

// ============================================================================
// Argument and return conversion
// ============================================================================

/// Owned parameter types an operation can accept
pub trait FromValue: Sized {
    /// Kind an argument must have
    const KIND: Kind;

    /// Convert an argument handle
    fn from_value(value: &Value<'_>) -> ReflectResult<Self>;
}

impl FromValue for String {
    const KIND: Kind = Kind::String;

    fn from_value(value: &Value<'_>) -> ReflectResult<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromValue for bool {
    const KIND: Kind = Kind::Bool;

    fn from_value(value: &Value<'_>) -> ReflectResult<Self> {
        value.as_bool()
    }
}

macro_rules! from_value_narrow {
    ($kind:ident, $getter:ident: $($ty:ty),*) => {
        $(
            impl FromValue for $ty {
                const KIND: Kind = Kind::$kind;

                fn from_value(value: &Value<'_>) -> ReflectResult<Self> {
                    let wide = value.$getter()?;
                    <$ty>::try_from(wide).map_err(|_| ReflectError::Overflow {
                        value: wide.to_string(),
                        type_name: stringify!($ty),
                    })
                }
            }
        )*
    };
}

from_value_narrow!(Int, as_int: i8, i16, i32, i64, isize);
from_value_narrow!(Uint, as_uint: u8, u16, u32, u64, usize);

impl FromValue for f64 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: &Value<'_>) -> ReflectResult<Self> {
        value.as_float()
    }
}

impl FromValue for f32 {
    const KIND: Kind = Kind::Float;

    fn from_value(value: &Value<'_>) -> ReflectResult<Self> {
        let wide = value.as_float()?;
        if crate::reflect::f32_fits(wide) {
            Ok(wide as f32)
        } else {
            Err(ReflectError::Overflow {
                value: wide.to_string(),
                type_name: "f32",
            })
        }
    }
}

/// Return types an operation can hand back to the caller
///
/// `()` returns nothing; reflectable types come back boxed. Structs get an
/// implementation from `#[derive(Reflect)]`.
pub trait IntoReturn {
    /// Box the value, or `None` for no value
    fn into_return(self) -> Returned;
}

impl IntoReturn for () {
    fn into_return(self) -> Returned {
        None
    }
}

macro_rules! into_return_boxed {
    ($($ty:ty),*) => {
        $(
            impl IntoReturn for $ty {
                fn into_return(self) -> Returned {
                    Some(Box::new(self))
                }
            }
        )*
    };
}

into_return_boxed!(String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl<T: Reflect> IntoReturn for Vec<T> {
    fn into_return(self) -> Returned {
        Some(Box::new(self))
    }
}

impl<T: Reflect> IntoReturn for Box<T> {
    fn into_return(self) -> Returned {
        Some(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        count: i64,
    }

    impl Reflect for Counter {
        fn type_name(&self) -> &'static str {
            "Counter"
        }

        fn reflect_ref(&self) -> crate::reflect::ReflectRef<'_> {
            crate::reflect::ReflectRef::Unsupported
        }

        fn reflect_mut(&mut self) -> crate::reflect::ReflectMut<'_> {
            crate::reflect::ReflectMut::Unsupported
        }
    }

    fn counter_table() -> MethodTable {
        MethodTable::builder::<Counter>("Counter")
            .by_value("Get", &[], |this, _| Ok(this.count))
            .by_reference("Add", &[Kind::Int], |this, args| {
                this.count += i64::from_value(&args[0])?;
                Ok(())
            })
            .by_value("Get", &[Kind::Bool], |_, _| Ok(0i64))
            .build()
    }

    #[test]
    fn test_builder_records_descriptors_in_order() {
        let table = counter_table();
        assert_eq!(table.type_name(), "Counter");
        assert_eq!(table.len(), 2);
        let names: Vec<_> = table.descriptors().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Get", "Add"]);
        assert_eq!(table.get("Get").unwrap().descriptor().params, Vec::<Kind>::new());
        assert_eq!(table.get("Add").unwrap().receiver(), Receiver::ByReference);
        assert!(table.get("Missing").is_none());
    }

    #[test]
    fn test_erased_bodies_run() {
        let table = counter_table();
        let mut counter = Counter { count: 1 };
        let amount = 4i64;

        let add = table.get("Add").unwrap();
        let result = add
            .call_exclusive(&mut counter, &[Value::of(&amount)])
            .unwrap();
        assert!(result.is_none());
        assert_eq!(counter.count, 5);

        let get = table.get("Get").unwrap();
        let result = get.call_shared(&counter, &[]).unwrap().unwrap();
        assert_eq!(Value::of(&*result).as_int().unwrap(), 5);

        assert!(add.call_shared(&counter, &[]).is_err());
    }

    #[test]
    fn test_wrong_receiver_type_is_an_error() {
        let table = counter_table();
        let stranger = String::from("not a counter");
        let err = table
            .get("Get")
            .unwrap()
            .call_shared(&stranger, &[])
            .unwrap_err();
        assert!(matches!(err, ReflectError::InvalidOperation(_)));
    }

    #[test]
    fn test_from_value_conversions() {
        let wide = 300i64;
        assert_eq!(i32::from_value(&Value::of(&wide)).unwrap(), 300);
        assert!(matches!(
            i8::from_value(&Value::of(&wide)),
            Err(ReflectError::Overflow { type_name: "i8", .. })
        ));
        assert!(String::from_value(&Value::of(&wide)).is_err());
        assert_eq!(<u16 as FromValue>::KIND, Kind::Uint);
        assert_eq!(<f32 as FromValue>::KIND, Kind::Float);
    }

    #[test]
    fn test_into_return() {
        assert!(().into_return().is_none());
        let boxed = String::from("hi").into_return().unwrap();
        assert_eq!(boxed.type_name(), "String");
    }
}
