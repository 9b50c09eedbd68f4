//! The `Reflect` trait and its read/write views
//!
//! A reflectable type exposes two views of itself:
//!
//! - [`ReflectRef`]: a read-only view used for classification and getters
//! - [`ReflectMut`]: an exclusive view used by setters
//!
//! Primitive implementations live here. Structs get theirs from
//! `#[derive(Reflect)]`, which also builds the static [`StructInfo`] table.

use std::any::Any;
use std::fmt;

use crate::descriptor::StructInfo;
use crate::method::MethodTable;

/// Object-safe access to `Any` for every reflectable type
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;
    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A type whose shape and contents can be inspected at runtime
pub trait Reflect: AsAny {
    /// Declared name of the concrete type
    fn type_name(&self) -> &'static str;

    /// Declared name of the type, without an instance
    fn reflect_name() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }

    /// Read-only view
    fn reflect_ref(&self) -> ReflectRef<'_>;

    /// Exclusive view used for in-place mutation
    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Per-type method table, if the type registered one
    fn method_table(&self) -> Option<&'static MethodTable> {
        None
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflect")
            .field("type_name", &self.type_name())
            .field("kind", &self.reflect_ref().kind())
            .finish()
    }
}

/// Structured value with an ordered set of named fields
pub trait Struct: Reflect {
    /// Static side table: type name, field names, raw tags
    fn struct_info(&self) -> &'static StructInfo;

    /// Field at declaration position `index`
    fn field_at(&self, index: usize) -> Option<&dyn Reflect>;

    /// Exclusive access to the field at declaration position `index`
    fn field_at_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Exclusive access to every field at once, in declaration order
    fn fields_mut(&mut self) -> Vec<&mut dyn Reflect>;

    /// Number of declared fields
    fn field_len(&self) -> usize {
        self.struct_info().len()
    }
}

/// Homogeneous sequence of reflectable elements
pub trait List: Reflect {
    /// Number of elements
    fn len(&self) -> usize;

    /// Element at `index`
    fn get(&self, index: usize) -> Option<&dyn Reflect>;

    /// Exclusive access to the element at `index`
    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// True when the sequence has no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only view of a reflectable value
pub enum ReflectRef<'a> {
    /// String contents
    String(&'a str),
    /// Signed integer, widened to 64 bits
    Int(i64),
    /// Unsigned integer, widened to 64 bits
    Uint(u64),
    /// Boolean
    Bool(bool),
    /// Float, widened to 64 bits
    Float(f64),
    /// Structured value
    Struct(&'a dyn Struct),
    /// Pointee of an owning pointer
    Pointer(&'a dyn Reflect),
    /// Sequence
    Slice(&'a dyn List),
    /// Shape not modelled by the toolkit
    Unsupported,
}

/// Exclusive view of a reflectable value
pub enum ReflectMut<'a> {
    /// String storage
    String(&'a mut String),
    /// Signed integer storage of its declared width
    Int(IntMut<'a>),
    /// Unsigned integer storage of its declared width
    Uint(UintMut<'a>),
    /// Boolean storage
    Bool(&'a mut bool),
    /// Float storage of its declared width
    Float(FloatMut<'a>),
    /// Structured value
    Struct(&'a mut dyn Struct),
    /// Pointee of an owning pointer
    Pointer(&'a mut dyn Reflect),
    /// Sequence
    Slice(&'a mut dyn List),
    /// Shape not modelled by the toolkit
    Unsupported,
}

macro_rules! width_slot {
    (
        $(#[$meta:meta])*
        $slot:ident, $wide:ty, { $($variant:ident => $ty:ty),* $(,)? }
    ) => {
        $(#[$meta])*
        pub enum $slot<'a> {
            $(
                #[allow(missing_docs)]
                $variant(&'a mut $ty),
            )*
        }

        impl $slot<'_> {
            /// Whether `value` fits the declared width without truncation
            pub fn fits(&self, value: $wide) -> bool {
                match self {
                    $($slot::$variant(_) => <$ty>::try_from(value).is_ok(),)*
                }
            }

            /// Store `value`, returning `false` if it does not fit
            pub fn store(self, value: $wide) -> bool {
                match self {
                    $(
                        $slot::$variant(slot) => match <$ty>::try_from(value) {
                            Ok(narrow) => {
                                *slot = narrow;
                                true
                            }
                            Err(_) => false,
                        },
                    )*
                }
            }

            /// Name of the declared storage type
            pub fn type_name(&self) -> &'static str {
                match self {
                    $($slot::$variant(_) => stringify!($ty),)*
                }
            }
        }
    };
}

width_slot! {
    /// Mutable signed integer storage
    IntMut, i64, { I8 => i8, I16 => i16, I32 => i32, I64 => i64, Isize => isize }
}

width_slot! {
    /// Mutable unsigned integer storage
    UintMut, u64, { U8 => u8, U16 => u16, U32 => u32, U64 => u64, Usize => usize }
}

/// Whether `value` survives narrowing to `f32` without becoming infinite
pub(crate) fn f32_fits(value: f64) -> bool {
    !value.is_finite() || value.abs() <= f32::MAX as f64
}

/// Mutable float storage
pub enum FloatMut<'a> {
    /// 32-bit storage
    F32(&'a mut f32),
    /// 64-bit storage
    F64(&'a mut f64),
}

impl FloatMut<'_> {
    /// Whether `value` is representable without overflowing to infinity
    pub fn fits(&self, value: f64) -> bool {
        match self {
            FloatMut::F32(_) => f32_fits(value),
            FloatMut::F64(_) => true,
        }
    }

    /// Store `value`, returning `false` if it does not fit
    pub fn store(self, value: f64) -> bool {
        if !self.fits(value) {
            return false;
        }
        match self {
            FloatMut::F32(slot) => *slot = value as f32,
            FloatMut::F64(slot) => *slot = value,
        }
        true
    }

    /// Name of the declared storage type
    pub fn type_name(&self) -> &'static str {
        match self {
            FloatMut::F32(_) => "f32",
            FloatMut::F64(_) => "f64",
        }
    }
}

// ============================================================================
// Primitive implementations
// ============================================================================

macro_rules! reflect_int {
    ($($ty:ty => $view:ident, $slot:ident :: $variant:ident, $wide:ty;)*) => {
        $(
            impl Reflect for $ty {
                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::$view(*self as $wide)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::$view($slot::$variant(self))
                }
            }
        )*
    };
}

reflect_int! {
    i8 => Int, IntMut::I8, i64;
    i16 => Int, IntMut::I16, i64;
    i32 => Int, IntMut::I32, i64;
    i64 => Int, IntMut::I64, i64;
    isize => Int, IntMut::Isize, i64;
    u8 => Uint, UintMut::U8, u64;
    u16 => Uint, UintMut::U16, u64;
    u32 => Uint, UintMut::U32, u64;
    u64 => Uint, UintMut::U64, u64;
    usize => Uint, UintMut::Usize, u64;
}

impl Reflect for f32 {
    fn type_name(&self) -> &'static str {
        "f32"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Float(*self as f64)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Float(FloatMut::F32(self))
    }
}

impl Reflect for f64 {
    fn type_name(&self) -> &'static str {
        "f64"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Float(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Float(FloatMut::F64(self))
    }
}

impl Reflect for bool {
    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Bool(*self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Bool(self)
    }
}

impl Reflect for String {
    fn type_name(&self) -> &'static str {
        "String"
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self.as_str())
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::String(self)
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(&**self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(&mut **self)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Slice(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Slice(self)
    }
}

impl<T: Reflect> List for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn get(&self, index: usize) -> Option<&dyn Reflect> {
        self.as_slice().get(index).map(|item| item as &dyn Reflect)
    }

    fn get_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.as_mut_slice()
            .get_mut(index)
            .map(|item| item as &mut dyn Reflect)
    }
}

macro_rules! reflect_unsupported {
    ($($ty:ty),*) => {
        $(
            impl Reflect for $ty {
                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Unsupported
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Unsupported
                }
            }
        )*
    };
}

reflect_unsupported!((), char);

impl<T: Any> Reflect for Option<T> {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Unsupported
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Unsupported
    }
}
