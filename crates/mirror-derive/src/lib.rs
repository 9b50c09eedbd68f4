// mirror-derive: per-type tables for mirror-reflect
//
// Provides:
// - #[derive(Reflect)] - field side table, tags, Reflect + Struct impls
// - #[reflect_methods] - method table for an inherent impl block
//
// Example:
// ```
// use mirror_reflect::{reflect_methods, Reflect};
//
// #[derive(Reflect)]
// #[reflect(methods)]
// struct Person {
//     #[reflect(name = "Name", tag = r#"json:"name""#)]
//     name: String,
// }
//
// #[reflect_methods]
// impl Person {
//     #[reflect(name = "SayHi")]
//     pub fn say_hi(&self, msg: String) { }
// }
// ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

mod attrs;
mod methods;
mod reflect;

/// Derives `Reflect` and `Struct` for a struct with named fields.
///
/// Struct attributes:
/// - `#[reflect(name = "...")]` - type name reported at runtime
/// - `#[reflect(methods)]` - expose the table built by `#[reflect_methods]`
///
/// Field attributes:
/// - `#[reflect(name = "...")]` - field name reported at runtime
/// - `#[reflect(tag = "...")]` - raw tag string, `key:"value"` pairs
/// - `#[reflect(skip)]` - leave the field out of the side table
///
/// # Example
///
/// ```ignore
/// #[derive(Reflect)]
/// #[reflect(name = "ClassModel")]
/// struct ClassModel {
///     #[reflect(tag = r#"orm:"name""#)]
///     name: String,
///     #[reflect(tag = r#"orm:"id""#)]
///     id: i64,
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(reflect))]
pub fn derive_reflect(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    reflect::expand_reflect(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Builds a method table from an inherent impl block.
///
/// Public methods taking `&self` are registered as by-value operations,
/// public methods taking `&mut self` as by-reference operations.
/// Associated functions and private methods are left out. Parameters must
/// implement `FromValue`; return types must implement `IntoReturn`.
///
/// Method attributes:
/// - `#[reflect(name = "...")]` - operation name used for lookup
/// - `#[reflect(skip)]` - leave the method out of the table
///
/// # Example
///
/// ```ignore
/// #[reflect_methods]
/// impl Person {
///     #[reflect(name = "SayBye")]
///     pub fn say_bye(&mut self, msg: String) {
///         self.last_message = msg;
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn reflect_methods(attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        return syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[reflect_methods] takes no arguments",
        )
        .to_compile_error()
        .into();
    }
    let input = parse_macro_input!(item as ItemImpl);
    methods::expand_methods(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
