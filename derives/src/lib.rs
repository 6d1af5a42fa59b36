//! Derive macros for iprovision
//!
//! This crate provides procedural macros for the iprovision framework.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, GenericParam, LitStr, TypeParam};

/// Generates the `Named` implementation for a provider type.
///
/// The identifier defaults to the type name and can be overridden with
/// `#[provider(name = "...")]`.
#[proc_macro_derive(IProvider, attributes(provider))]
pub fn derive_provider(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;

    let mut identifier = LitStr::new(&name.to_string(), name.span());
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("provider")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                identifier = meta.value()?.parse()?;
                Ok(())
            } else {
                Err(meta.error("unsupported provider attribute, expected `name = \"...\"`"))
            }
        });
        if let Err(err) = parsed {
            return err.to_compile_error().into();
        }
    }

    if identifier.value().is_empty() {
        return syn::Error::new(identifier.span(), "provider name must not be empty")
            .to_compile_error()
            .into();
    }

    let generics = input.generics;
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let mut where_predicates = where_clause
        .map(|w| w.predicates.clone().into_iter().collect())
        .unwrap_or_else(Vec::new);

    // Named requires 'static on every type parameter
    for param in generics.params.iter() {
        if let GenericParam::Type(TypeParam { ident, .. }) = param {
            where_predicates.push(syn::parse_quote!(#ident: 'static));
        }
    }

    let where_clause = if !where_predicates.is_empty() {
        quote! { where #(#where_predicates),* }
    } else {
        quote! {}
    };

    let expanded = quote! {
        impl #impl_generics ::iprovision::Named for #name #ty_generics #where_clause {
            const NAME: &'static str = #identifier;
        }
    };

    TokenStream::from(expanded)
}
