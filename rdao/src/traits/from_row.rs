//! Row access and row mapping

use crate::error::{Error, Result};
use crate::traits::FromValue;
use crate::value::Value;

/// A result row handed to a row mapper.
///
/// Rows are only lent to mappers (`&dyn Row`) for the duration of one
/// mapping call. Implementations expose the row shape as an ordered list of
/// column names.
pub trait Row {
    /// Column names, in select-list order.
    fn columns(&self) -> &[String];

    /// Get a value by zero-based column position.
    fn get_value_at(&self, index: usize) -> Result<Value>;

    /// Get a value from the row by column name.
    ///
    /// Returns an error if the column doesn't exist.
    fn get_value(&self, column: &str) -> Result<Value> {
        let index = self
            .columns()
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| Error::ColumnNotFound(column.to_string()))?;
        self.get_value_at(index)
    }
}

/// Extension trait for typed access to row values.
pub trait RowExt: Row {
    /// Get a typed value from the row by column name.
    fn get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self.get_value(column)?;
        if value.is_null() {
            // Option<T> maps NULL to None; anything else reports the column.
            return T::from_value(value).map_err(|_| Error::UnexpectedNull(column.to_string()));
        }
        T::from_value(value)
    }

    /// Get a typed value by zero-based column position.
    fn get_at<T: FromValue>(&self, index: usize) -> Result<T> {
        T::from_value(self.get_value_at(index)?)
    }
}

impl<R: Row + ?Sized> RowExt for R {}

/// Trait for types that can be constructed from a database row.
///
/// Usually implemented via `#[derive(FromRow)]`.
///
/// # Manual Implementation
///
/// ```ignore
/// use rdao::{FromRow, Row, RowExt, Result};
///
/// pub struct User {
///     pub id: i64,
///     pub username: String,
/// }
///
/// impl FromRow for User {
///     fn from_row<R: Row + ?Sized>(row: &R) -> Result<Self> {
///         Ok(Self {
///             id: row.get("id")?,
///             username: row.get("username")?,
///         })
///     }
///
///     fn column_names() -> &'static [&'static str] {
///         &["id", "username"]
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Construct an instance of this type from a database row.
    fn from_row<R: Row + ?Sized>(row: &R) -> Result<Self>;

    /// Get the column names that this type reads from.
    fn column_names() -> &'static [&'static str];

    /// Comma-separated column list for SELECT statements.
    fn select_list() -> String {
        Self::column_names().join(", ")
    }
}
