//! Name-based method dispatch
//!
//! [`resolve`] finds an operation on the runtime type behind a handle and
//! binds it to that handle's receiver. By-value operations are reachable
//! from every handle; by-reference operations only from addressable ones.
//! A lookup that finds nothing reports [`ReflectError::NotFound`] and leaves
//! the object untouched.

use std::fmt;

use crate::error::{ReflectError, ReflectResult};
use crate::method::{MethodDescriptor, MethodEntry, Receiver, Returned};
use crate::reflect::Reflect;
use crate::value::Value;

enum Bound<'v> {
    Shared(&'v dyn Reflect),
    Exclusive(&'v mut dyn Reflect),
}

/// An operation bound to its receiver, ready to invoke
pub struct Callable<'v> {
    entry: &'static MethodEntry,
    type_name: &'static str,
    receiver: Bound<'v>,
}

/// Resolve the operation called `name` on the object behind `object`.
///
/// A `Pointer` handle resolves against the table of the value it refers to.
pub fn resolve<'v>(object: &'v mut Value<'_>, name: &str) -> ReflectResult<Callable<'v>> {
    let addressable = object.is_addressable();
    let target = object.pointee();
    let type_name = target.type_name();

    let entry = target
        .method_table()
        .and_then(|table| table.get(name))
        .filter(|entry| match entry.receiver() {
            Receiver::ByValue => true,
            Receiver::ByReference => addressable,
        });
    let Some(entry) = entry else {
        tracing::debug!(type_name, method = name, addressable, "method not found");
        return Err(ReflectError::NotFound {
            type_name: type_name.to_string(),
            method: name.to_string(),
        });
    };

    let receiver = match entry.receiver() {
        Receiver::ByValue => {
            let object: &'v Value<'_> = object;
            Bound::Shared(object.pointee())
        }
        Receiver::ByReference => {
            Bound::Exclusive(object.pointee_mut("call a by-reference method")?)
        }
    };
    tracing::debug!(type_name, method = name, receiver = ?entry.receiver(), "resolved method");
    Ok(Callable {
        entry,
        type_name,
        receiver,
    })
}

/// Descriptors of the operations reachable from `object`, in table order.
///
/// Read-only handles see by-value operations only.
pub fn method_set(object: &Value<'_>) -> Vec<MethodDescriptor> {
    let addressable = object.is_addressable();
    object
        .pointee()
        .method_table()
        .map(|table| {
            table
                .descriptors()
                .filter(|descriptor| addressable || descriptor.receiver == Receiver::ByValue)
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}

impl Callable<'_> {
    /// Descriptor of the bound operation
    pub fn descriptor(&self) -> &MethodDescriptor {
        self.entry.descriptor()
    }

    /// Invoke with positional arguments.
    ///
    /// Returns the operation's result, if it produces one.
    pub fn invoke(&mut self, args: &[&dyn Reflect]) -> ReflectResult<Returned> {
        let args: Vec<Value<'_>> = args.iter().map(|&arg| Value::of(arg)).collect();
        self.invoke_values(&args)
    }

    /// Invoke with arguments that are already wrapped as handles
    pub fn invoke_values(&mut self, args: &[Value<'_>]) -> ReflectResult<Returned> {
        let descriptor = self.entry.descriptor();
        if args.len() != descriptor.params.len() {
            return Err(ReflectError::ArityMismatch {
                method: descriptor.name.clone(),
                expected: descriptor.params.len(),
                found: args.len(),
            });
        }
        for (index, (arg, &expected)) in args.iter().zip(&descriptor.params).enumerate() {
            let found = arg.kind();
            if found != expected {
                return Err(ReflectError::ArgumentKindMismatch {
                    method: descriptor.name.clone(),
                    index,
                    expected,
                    found,
                });
            }
        }

        tracing::debug!(
            type_name = self.type_name,
            method = %descriptor.name,
            args = args.len(),
            "invoking method"
        );
        match &mut self.receiver {
            Bound::Shared(this) => self.entry.call_shared((**this).as_any(), args),
            Bound::Exclusive(this) => self.entry.call_exclusive((**this).as_any_mut(), args),
        }
    }
}

impl fmt::Debug for Callable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("type_name", &self.type_name)
            .field("method", self.entry.descriptor())
            .finish()
    }
}

