// #[derive(Reflect)] implementation
//
// Emits the static field side table plus Reflect, Struct and IntoReturn
// impls for a struct with named fields.

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, LitStr, Result};

use crate::attrs::{self, Position};

/// Expands #[derive(Reflect)].
///
/// Example expansion:
/// ```ignore
/// // Input:
/// #[derive(Reflect)]
/// struct Person {
///     #[reflect(tag = r#"json:"name""#)]
///     name: String,
/// }
///
/// // Output (abridged):
/// impl ::mirror_reflect::Reflect for Person {
///     fn type_name(&self) -> &'static str { "Person" }
///     fn reflect_ref(&self) -> ReflectRef<'_> { ReflectRef::Struct(self) }
///     fn reflect_mut(&mut self) -> ReflectMut<'_> { ReflectMut::Struct(self) }
/// }
///
/// impl ::mirror_reflect::Struct for Person {
///     fn struct_info(&self) -> &'static StructInfo {
///         static FIELDS: [FieldInfo; 1] = [FieldInfo::new("name", "json:\"name\"")];
///         static INFO: StructInfo = StructInfo::new("Person", &FIELDS);
///         &INFO
///     }
///     fn field_at(&self, index: usize) -> Option<&dyn Reflect> {
///         match index { 0 => Some(&self.name), _ => None }
///     }
///     // field_at_mut, fields_mut
/// }
/// ```
pub fn expand_reflect(input: DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;
    let options = attrs::parse(&input.attrs, Position::Struct)?;
    let type_name = options
        .name
        .unwrap_or_else(|| LitStr::new(&ident.unraw().to_string(), ident.span()));

    let named = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => Some(&named.named),
            Fields::Unit => None,
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "#[derive(Reflect)] requires named fields",
                ));
            }
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "#[derive(Reflect)] only supports structs",
            ));
        }
    };

    // Reflected fields in declaration order
    let mut members = Vec::new();
    let mut names = Vec::new();
    let mut tags = Vec::new();
    let mut types = Vec::new();
    for field in named.into_iter().flatten() {
        let field_options = attrs::parse(&field.attrs, Position::Field)?;
        if field_options.skip {
            continue;
        }
        let Some(member) = field.ident.as_ref() else {
            continue;
        };
        let name = field_options
            .name
            .unwrap_or_else(|| LitStr::new(&member.unraw().to_string(), member.span()));
        let tag = field_options
            .tag
            .unwrap_or_else(|| LitStr::new("", member.span()));
        members.push(member.clone());
        names.push(name);
        tags.push(tag);
        types.push(field.ty.clone());
    }

    let field_count = members.len();
    let indices: Vec<usize> = (0..field_count).collect();

    let mut generics = input.generics.clone();
    if !types.is_empty() {
        let where_clause = generics.make_where_clause();
        for ty in &types {
            where_clause
                .predicates
                .push(syn::parse_quote!(#ty: ::mirror_reflect::Reflect));
        }
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let method_table = if options.methods {
        quote! {
            fn method_table(&self) -> ::core::option::Option<&'static ::mirror_reflect::MethodTable> {
                ::core::option::Option::Some(<Self as ::mirror_reflect::Methods>::methods())
            }
        }
    } else {
        quote! {}
    };

    Ok(quote! {
        impl #impl_generics ::mirror_reflect::Reflect for #ident #ty_generics #where_clause {
            fn type_name(&self) -> &'static str {
                #type_name
            }

            fn reflect_name() -> &'static str
            where
                Self: ::core::marker::Sized,
            {
                #type_name
            }

            fn reflect_ref(&self) -> ::mirror_reflect::ReflectRef<'_> {
                ::mirror_reflect::ReflectRef::Struct(self)
            }

            fn reflect_mut(&mut self) -> ::mirror_reflect::ReflectMut<'_> {
                ::mirror_reflect::ReflectMut::Struct(self)
            }

            #method_table
        }

        impl #impl_generics ::mirror_reflect::Struct for #ident #ty_generics #where_clause {
            fn struct_info(&self) -> &'static ::mirror_reflect::StructInfo {
                static FIELDS: [::mirror_reflect::FieldInfo; #field_count] = [
                    #(::mirror_reflect::FieldInfo::new(#names, #tags)),*
                ];
                static INFO: ::mirror_reflect::StructInfo =
                    ::mirror_reflect::StructInfo::new(#type_name, &FIELDS);
                &INFO
            }

            fn field_at(&self, index: usize) -> ::core::option::Option<&dyn ::mirror_reflect::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&self.#members),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn field_at_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::mirror_reflect::Reflect> {
                match index {
                    #(#indices => ::core::option::Option::Some(&mut self.#members),)*
                    _ => ::core::option::Option::None,
                }
            }

            fn fields_mut(&mut self) -> ::std::vec::Vec<&mut dyn ::mirror_reflect::Reflect> {
                ::std::vec![#(&mut self.#members as &mut dyn ::mirror_reflect::Reflect),*]
            }
        }

        impl #impl_generics ::mirror_reflect::IntoReturn for #ident #ty_generics #where_clause {
            fn into_return(self) -> ::mirror_reflect::Returned {
                ::core::option::Option::Some(::std::boxed::Box::new(self))
            }
        }
    })
}
