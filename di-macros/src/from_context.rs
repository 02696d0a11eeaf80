//! Expansion of `#[derive(FromContext)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, Type};

use crate::named_fields;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let context = context_type(input)?;

    let inits = named_fields(input, "FromContext")?.iter().map(|field| {
        let field_name = &field.ident;
        let field_type = &field.ty;

        quote! {
            #field_name: <#field_type as crate::FromRef<#context>>::from_ref(ctx)
        }
    });

    Ok(quote! {
        impl #impl_generics crate::FromRef<#context> for #name #ty_generics #where_clause {
            fn from_ref(ctx: &#context) -> Self {
                Self { #(#inits),* }
            }
        }
    })
}

/// Reads `#[from_context(Context = "Path")]`, defaulting to `Context`.
fn context_type(input: &DeriveInput) -> syn::Result<TokenStream> {
    let mut context: Option<Type> = None;

    for attr in input.attrs.iter().filter(|a| a.path().is_ident("from_context")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("Context") {
                let value: LitStr = meta.value()?.parse()?;
                context = Some(value.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `Context = \"...\"`"))
            }
        })?;
    }

    Ok(match context {
        Some(ty) => quote! { #ty },
        None => quote! { Context },
    })
}
