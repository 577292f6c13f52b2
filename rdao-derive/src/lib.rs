//! Derive macros for rdao
//!
//! - `FromRow` builds a struct from a result row, so `T::from_row` can be
//!   handed to `Dao::select` as the row mapper.
//! - `ToParams` lists a struct's columns and values, which `BatchInsert`
//!   uses to write the INSERT and bind one parameter slot per item.
//!
//! Both are re-exported from `rdao`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod attrs;
mod from_row;
mod to_params;

/// Derive `rdao::FromRow`.
///
/// Each field is read with `RowExt::get` from the column of the same name.
/// An `Option` field maps SQL NULL to `None`; any other field reports
/// `Error::UnexpectedNull`.
///
/// # Attributes
///
/// - `#[rdao(rename = "column")]` reads a differently named column
/// - `#[rdao(skip)]` leaves the field out of `column_names` and fills it
///   with `Default::default()`
///
/// # Example
///
/// ```ignore
/// use rdao::{params, FromRow};
///
/// #[derive(FromRow)]
/// pub struct SomeEntity {
///     pub id: Option<i64>,
///     #[rdao(rename = "svalue")]
///     pub value: Option<String>,
///     #[rdao(skip)]
///     pub dirty: bool,
/// }
///
/// let sql = format!("SELECT {} FROM some_entity", SomeEntity::select_list());
/// let rows = dao.select(&sql, |row| SomeEntity::from_row(row), params![]);
/// ```
#[proc_macro_derive(FromRow, attributes(rdao))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::derive_from_row_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `rdao::ToParams`.
///
/// Values are produced in field order; `None` binds an explicit NULL.
///
/// # Attributes
///
/// - `#[rdao(rename = "column")]` writes a differently named column
/// - `#[rdao(skip_insert)]` leaves the field out of the `insert_*` lists,
///   for keys the database generates
///
/// # Example
///
/// ```ignore
/// use rdao::{BatchInsert, RowExt, ToParams};
///
/// #[derive(ToParams)]
/// pub struct SomeEntity {
///     #[rdao(skip_insert)]
///     pub id: Option<i64>,
///     pub svalue: Option<String>,
/// }
///
/// // INSERT INTO `some_entity` (`svalue`) VALUES (?), one slot per entity
/// let ids = BatchInsert::new("some_entity")
///     .returning("id")
///     .execute_returning(&dao, entities, |row, _entity| row.get::<i64>("id"));
/// ```
#[proc_macro_derive(ToParams, attributes(rdao))]
pub fn derive_to_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    to_params::derive_to_params_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
