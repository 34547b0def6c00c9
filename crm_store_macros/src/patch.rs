use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::DeriveInput;

use crate::fields::{forwarded, id_field, is_option, named_fields, patch_skipped, serde_only};

pub fn derive_patch(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;
    let patch_name = format_ident!("{}Patch", name);

    let fields = named_fields(input, "Patch")?;
    // The id is identity, never a mergeable field.
    let id = id_field(&fields);

    let patchable: Vec<_> = fields
        .iter()
        .filter(|field| field.ident.is_some() && field.ident != id)
        .filter(|field| !patch_skipped(&field.attrs))
        .collect();

    let field_defs = patchable.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let field_vis = &field.vis;
        let attrs = forwarded(&field.attrs);
        // `null` must reach the target as `Some(None)`, not read as unset.
        let nullable = is_option(ty).then(|| {
            quote! {
                #[serde(default, deserialize_with = "::crm_store::deserialize_some")]
            }
        });
        quote! {
            #(#attrs)*
            #nullable
            #[serde(skip_serializing_if = "Option::is_none")]
            #field_vis #ident: ::core::option::Option<#ty>
        }
    });

    let apply_stmts = patchable.iter().map(|field| {
        let ident = &field.ident;
        quote! {
            if let ::core::option::Option::Some(value) = self.#ident {
                target.#ident = value;
            }
        }
    });

    let empty_checks = patchable.iter().map(|field| {
        let ident = &field.ident;
        quote! { self.#ident.is_none() }
    });

    let setters = patchable.iter().map(|field| {
        let ident = field.ident.as_ref().expect("filtered to named fields");
        let ty = &field.ty;
        let setter = format_ident!("with_{}", ident);
        let doc = format!("Set `{}` on the patch.", ident);
        quote! {
            #[doc = #doc]
            pub fn #setter(mut self, value: #ty) -> Self {
                self.#ident = ::core::option::Option::Some(value);
                self
            }
        }
    });

    let container_attrs = serde_only(&input.attrs);
    let doc = format!(
        "Field-level partial update for `{}`. Unset fields are left untouched.",
        name
    );

    Ok(quote! {
        #[doc = #doc]
        #[derive(Clone, Debug, Default, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #(#container_attrs)*
        #[serde(default)]
        #vis struct #patch_name {
            #(#field_defs),*
        }

        impl #patch_name {
            #(#setters)*

            /// Merge the set fields onto `target`.
            pub fn apply(self, target: &mut #name) {
                #(#apply_stmts)*
            }

            /// True when no field is set.
            pub fn is_empty(&self) -> bool {
                true #(&& #empty_checks)*
            }
        }
    })
}
