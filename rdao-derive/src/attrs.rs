//! `#[rdao(...)]` attribute parsing shared by the derives

use syn::{spanned::Spanned, Data, DeriveInput, Error, Field, Fields, Ident, Result, Type};

/// One named field and its `#[rdao(...)]` options.
pub struct FieldAttrs {
    pub ident: Ident,
    pub ty: Type,
    /// Column name, after `rename`
    pub column: String,
    /// Not read from rows; filled with `Default::default()`
    pub skip: bool,
    /// Not written by inserts, e.g. auto-increment keys
    pub skip_insert: bool,
}

impl FieldAttrs {
    fn parse(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;

        let mut attrs = FieldAttrs {
            column: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            skip: false,
            skip_insert: false,
        };

        for attr in field.attrs.iter().filter(|a| a.path().is_ident("rdao")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: syn::LitStr = meta.value()?.parse()?;
                    attrs.column = lit.value();
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                } else if meta.path.is_ident("skip_insert") {
                    attrs.skip_insert = true;
                } else {
                    let name = meta
                        .path
                        .get_ident()
                        .map(|i| i.to_string())
                        .unwrap_or_default();
                    return Err(meta.error(format!("unknown rdao attribute `{}`", name)));
                }
                Ok(())
            })?;
        }

        Ok(attrs)
    }
}

/// Parse the named fields of a struct.
pub fn struct_fields(input: &DeriveInput) -> Result<Vec<FieldAttrs>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };
    fields.iter().map(FieldAttrs::parse).collect()
}
