//! Mirror - runtime introspection and dynamic dispatch
//!
//! Given a value whose concrete type is not known statically, this crate
//! lets a caller:
//!
//! - classify its shape ([`classify`] / [`Kind`])
//! - read it and, through an addressable handle, mutate it ([`Value`])
//! - enumerate a struct's fields together with their tags ([`describe`])
//! - look up and call named operations at runtime ([`resolve`])
//!
//! Types opt in with `#[derive(Reflect)]`; operations are registered with
//! `#[reflect_methods]` on an inherent impl.
//!
//! # Example
//!
//! ```ignore
//! use mirror_reflect::{describe, resolve, reflect_methods, Reflect, Value};
//!
//! #[derive(Reflect)]
//! #[reflect(methods)]
//! struct Person {
//!     #[reflect(tag = r#"json:"name""#)]
//!     name: String,
//! }
//!
//! #[reflect_methods]
//! impl Person {
//!     #[reflect(name = "Rename")]
//!     pub fn rename(&mut self, name: String) {
//!         self.name = name;
//!     }
//! }
//!
//! let mut person = Person { name: "Mike".into() };
//! let descriptor = describe(&Value::of(&person))?;
//! assert_eq!(descriptor.fields[0].tag("json"), Some("name"));
//!
//! let mut handle = Value::of_mut(&mut person);
//! resolve(&mut handle, "Rename")?.invoke(&[&String::from("Amy")])?;
//! ```

#![warn(missing_docs)]

extern crate self as mirror_reflect;

mod descriptor;
mod dispatch;
mod error;
mod kind;
mod method;
mod reflect;
mod tags;
mod value;
mod walker;

pub use descriptor::{FieldDescriptor, FieldInfo, StructInfo, TypeDescriptor};
pub use dispatch::{method_set, resolve, Callable};
pub use error::{ReflectError, ReflectResult};
pub use kind::{classify, Kind};
pub use method::{
    FromValue, IntoReturn, MethodDescriptor, MethodEntry, MethodTable, MethodTableBuilder,
    Methods, Receiver, Returned,
};
pub use reflect::{
    AsAny, FloatMut, IntMut, List, Reflect, ReflectMut, ReflectRef, Struct, UintMut,
};
pub use tags::{lookup as lookup_tag, TagSyntaxError, Tags};
pub use value::Value;
pub use walker::{describe, describe_struct, fields, fields_mut};

pub use mirror_derive::{reflect_methods, Reflect};

/// Support items for generated code. Not public API.
#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;

    use crate::{ReflectError, ReflectResult, Value};

    /// Positional argument `index`, or `IndexOutOfRange`
    pub fn arg<'s, 'v>(args: &'s [Value<'v>], index: usize) -> ReflectResult<&'s Value<'v>> {
        args.get(index).ok_or(ReflectError::IndexOutOfRange {
            index,
            len: args.len(),
        })
    }
}
