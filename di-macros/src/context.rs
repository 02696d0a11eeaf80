//! Expansion of `#[derive(Context)]`.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::named_fields;

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let impls = named_fields(input, "Context")?.iter().map(|field| {
        let field_name = &field.ident;
        let field_type = &field.ty;

        quote! {
            impl #impl_generics crate::FromRef<#name #ty_generics> for #field_type #where_clause {
                fn from_ref(ctx: &#name #ty_generics) -> Self {
                    ::core::clone::Clone::clone(&ctx.#field_name)
                }
            }
        }
    });

    Ok(quote! { #(#impls)* })
}
