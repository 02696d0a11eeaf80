//! Compile-time dependency injection derives.
//!
//! - `#[derive(Context)]` makes every field of a root context extractable
//! - `#[derive(FromContext)]` builds a struct by extracting each field
//!
//! Generated code refers to `crate::FromRef`, so the consuming crate must
//! define or re-export that trait at its root.

use proc_macro::TokenStream;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Data, DeriveInput, Field, Fields, Token};

mod context;
mod from_context;

/// Derive macro for a DI root context.
///
/// Generates `impl FromRef<Ctx> for FieldType` for each field, cloning the
/// field out of the context. Field types must be `Clone` and distinct.
///
/// # Example
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct Context {
///     pub graph: AppGraph,
///     pub config: Arc<Config>,
/// }
///
/// // Generated:
/// // impl FromRef<Context> for AppGraph { ... }
/// // impl FromRef<Context> for Arc<Config> { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Derive macro for types resolved from a context.
///
/// Generates `impl FromRef<Context>` that resolves every field with
/// `FromRef::from_ref(ctx)`. The context type defaults to `Context` in
/// scope and can be overridden with `#[from_context(Context = "MyContext")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct SearchService {
///     graph: AppGraph,        // AppGraph::from_ref(ctx)
///     types: TypeRepository, // TypeRepository::from_ref(ctx)
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_context::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// Returns the named fields of a struct, or an error naming the derive.
fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Token![,]>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
