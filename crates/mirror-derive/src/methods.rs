// #[reflect_methods] implementation
//
// Collects the public methods of an inherent impl block into a lazily
// built MethodTable and implements mirror_reflect::Methods for the type.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::{FnArg, ImplItem, ItemImpl, LitStr, Result, Type, Visibility};

use crate::attrs::{self, Position};

/// Expands the #[reflect_methods] attribute macro.
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[reflect_methods]
/// impl Person {
///     #[reflect(name = "SayHi")]
///     pub fn say_hi(&self, msg: String) { }
/// }
///
/// // Output:
/// impl Person {
///     pub fn say_hi(&self, msg: String) { }
/// }
///
/// impl ::mirror_reflect::Methods for Person {
///     fn methods() -> &'static ::mirror_reflect::MethodTable {
///         static TABLE: Lazy<MethodTable> = Lazy::new(|| {
///             MethodTable::builder::<Person>(<Person as Reflect>::reflect_name())
///                 .by_value("SayHi", &[<String as FromValue>::KIND], |this, args| {
///                     let arg0 = <String as FromValue>::from_value(arg(args, 0)?)?;
///                     Ok(this.say_hi(arg0))
///                 })
///                 .build()
///         });
///         &TABLE
///     }
/// }
/// ```
pub fn expand_methods(mut item: ItemImpl) -> Result<TokenStream> {
    if let Some((_, path, _)) = &item.trait_ {
        return Err(syn::Error::new_spanned(
            path,
            "#[reflect_methods] must be placed on an inherent impl block",
        ));
    }
    if !item.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "#[reflect_methods] does not support generic impl blocks",
        ));
    }

    let self_ty = item.self_ty.clone();
    check_receiver_type(&self_ty)?;

    let mut registrations = Vec::new();
    let mut seen = HashSet::new();
    for impl_item in &mut item.items {
        let ImplItem::Fn(method) = impl_item else {
            continue;
        };
        let options = attrs::parse(&method.attrs, Position::Method)?;
        attrs::strip(&mut method.attrs);

        if options.skip || !matches!(method.vis, Visibility::Public(_)) {
            continue;
        }
        // Associated functions have no receiver to dispatch on
        let Some(receiver) = method.sig.receiver() else {
            continue;
        };
        if receiver.colon_token.is_some() || receiver.reference.is_none() {
            return Err(syn::Error::new_spanned(
                receiver,
                "reflected methods must take &self or &mut self; \
                 add #[reflect(skip)] to leave this method out",
            ));
        }
        if method.sig.asyncness.is_some() || !method.sig.generics.params.is_empty() {
            return Err(syn::Error::new_spanned(
                &method.sig,
                "async and generic methods cannot be reflected; \
                 add #[reflect(skip)] to leave this method out",
            ));
        }

        let ident = &method.sig.ident;
        let name = options
            .name
            .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span()));
        if !seen.insert(name.value()) {
            return Err(syn::Error::new_spanned(
                &name,
                format!("duplicate reflected method name '{}'", name.value()),
            ));
        }

        let param_types: Vec<&Type> = method
            .sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(pat_type) => Some(&*pat_type.ty),
                FnArg::Receiver(_) => None,
            })
            .collect();
        let arg_names: Vec<_> = (0..param_types.len())
            .map(|i| format_ident!("arg{}", i))
            .collect();
        let positions: Vec<usize> = (0..param_types.len()).collect();
        let args = if param_types.is_empty() {
            format_ident!("_args")
        } else {
            format_ident!("args")
        };

        let register = if receiver.mutability.is_some() {
            format_ident!("by_reference")
        } else {
            format_ident!("by_value")
        };

        registrations.push(quote! {
            .#register(
                #name,
                &[#(<#param_types as ::mirror_reflect::FromValue>::KIND),*],
                |this, #args| {
                    #(
                        let #arg_names = <#param_types as ::mirror_reflect::FromValue>::from_value(
                            ::mirror_reflect::__private::arg(#args, #positions)?,
                        )?;
                    )*
                    ::core::result::Result::Ok(this.#ident(#(#arg_names),*))
                },
            )
        });
    }

    Ok(quote! {
        #item

        impl ::mirror_reflect::Methods for #self_ty {
            fn methods() -> &'static ::mirror_reflect::MethodTable {
                static TABLE: ::mirror_reflect::__private::Lazy<::mirror_reflect::MethodTable> =
                    ::mirror_reflect::__private::Lazy::new(|| {
                        ::mirror_reflect::MethodTable::builder::<#self_ty>(
                            <#self_ty as ::mirror_reflect::Reflect>::reflect_name(),
                        )
                            #(#registrations)*
                            .build()
                    });
                &TABLE
            }
        }
    })
}

/// Method tables hang off named types only
fn check_receiver_type(self_ty: &Type) -> Result<()> {
    match self_ty {
        Type::Path(path) if path.qself.is_none() => Ok(()),
        _ => Err(syn::Error::new_spanned(
            self_ty,
            "#[reflect_methods] requires a named receiver type",
        )),
    }
}
