//! ToParams derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::{struct_fields, FieldAttrs};

fn to_value(field: &FieldAttrs) -> TokenStream {
    let ident = &field.ident;
    quote! { ::rdao::ToValue::to_value(&self.#ident) }
}

pub fn derive_to_params_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = struct_fields(&input)?;

    let insert_fields: Vec<&FieldAttrs> = fields.iter().filter(|f| !f.skip_insert).collect();
    let insert_columns = insert_fields.iter().map(|f| f.column.as_str());
    let insert_values = insert_fields.iter().map(|f| to_value(f));
    let all_columns = fields.iter().map(|f| f.column.as_str());
    let all_values = fields.iter().map(to_value);

    Ok(quote! {
        impl #impl_generics ::rdao::ToParams for #name #ty_generics #where_clause {
            fn insert_column_names() -> &'static [&'static str] {
                &[#(#insert_columns),*]
            }

            fn insert_values(&self) -> ::std::vec::Vec<::rdao::Value> {
                ::std::vec![#(#insert_values),*]
            }

            fn all_column_names() -> &'static [&'static str] {
                &[#(#all_columns),*]
            }

            fn all_values(&self) -> ::std::vec::Vec<::rdao::Value> {
                ::std::vec![#(#all_values),*]
            }
        }
    })
}
