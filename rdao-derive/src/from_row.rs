//! FromRow derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

use crate::attrs::struct_fields;

pub fn derive_from_row_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = struct_fields(&input)?;

    let field_extractions = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let column = &field.column;
        if field.skip {
            quote! { #ident: <#ty as ::std::default::Default>::default() }
        } else {
            quote! { #ident: ::rdao::RowExt::get::<#ty>(row, #column)? }
        }
    });

    let column_names = fields
        .iter()
        .filter(|f| !f.skip)
        .map(|f| f.column.as_str());

    Ok(quote! {
        impl #impl_generics ::rdao::FromRow for #name #ty_generics #where_clause {
            fn from_row<R: ::rdao::Row + ?Sized>(row: &R) -> ::rdao::Result<Self> {
                Ok(Self {
                    #(#field_extractions),*
                })
            }

            fn column_names() -> &'static [&'static str] {
                &[#(#column_names),*]
            }
        }
    })
}
