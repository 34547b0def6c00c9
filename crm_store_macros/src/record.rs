use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, LitStr};

use crate::fields::{forwarded, id_field, named_fields, serde_only, to_snake_case};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let vis = &input.vis;
    let draft_name = format_ident!("{}Draft", name);
    let collection = extract_collection(input);

    let fields = named_fields(input, "Record")?;
    let id = id_field(&fields).ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "Record derive: no field marked with #[record(id)] and no field named `id`",
        )
    })?;

    let data_fields: Vec<_> = fields
        .iter()
        .filter(|field| field.ident.as_ref() != Some(&id))
        .collect();

    let draft_defs = data_fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let field_vis = &field.vis;
        let attrs = forwarded(&field.attrs);
        quote! {
            #(#attrs)*
            #field_vis #ident: #ty
        }
    });
    let into_assignments = data_fields.iter().map(|field| {
        let ident = &field.ident;
        quote! { #ident: self.#ident }
    });
    let from_assignments = data_fields.iter().map(|field| {
        let ident = &field.ident;
        quote! { #ident: record.#ident }
    });
    let container_attrs = serde_only(&input.attrs);
    let doc = format!("`{}` without its id, as accepted by the store's add operation.", name);

    Ok(quote! {
        impl ::crm_store::Record for #name {
            const COLLECTION: &'static str = #collection;

            fn id(&self) -> u64 {
                self.#id
            }
        }

        #[doc = #doc]
        #[derive(Clone, Debug, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        #(#container_attrs)*
        #vis struct #draft_name {
            #(#draft_defs),*
        }

        impl #draft_name {
            /// Attach an id, producing the stored record.
            pub fn into_record(self, #id: u64) -> #name {
                #name {
                    #id,
                    #(#into_assignments),*
                }
            }
        }

        impl ::core::convert::From<#name> for #draft_name {
            fn from(record: #name) -> Self {
                #draft_name {
                    #(#from_assignments),*
                }
            }
        }
    })
}

fn extract_collection(input: &DeriveInput) -> String {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let mut collection = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
            }
            Ok(())
        });

        if let Some(c) = collection {
            return c;
        }
    }

    format!("{}s", to_snake_case(&input.ident.to_string()))
}
