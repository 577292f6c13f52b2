//! MySQL row implementation

use crate::error::{Error, Result};
use crate::traits::Row;
use crate::value::Value;
use mysql_async::Row as MySqlAsyncRow;

use super::types::from_column_value;

/// A MySQL database row.
///
/// Holds the column names and converted values of one result row, in
/// select-list order.
#[derive(Debug, Clone)]
pub struct MySqlRow {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl MySqlRow {
    /// Create a new MySqlRow from a mysql_async Row.
    pub fn from_mysql_row(row: MySqlAsyncRow) -> Result<Self> {
        let column_refs = row.columns_ref();
        let mut columns = Vec::with_capacity(column_refs.len());
        let mut values = Vec::with_capacity(column_refs.len());

        for (i, column) in column_refs.iter().enumerate() {
            let column_name = column.name_str().to_string();
            let mysql_value = row
                .as_ref(i)
                .ok_or_else(|| Error::ColumnNotFound(column_name.clone()))?
                .clone();
            values.push(from_column_value(mysql_value, column)?);
            columns.push(column_name);
        }

        Ok(Self { columns, values })
    }

    /// A row holding one generated key.
    pub(crate) fn generated(column: &str, id: u64) -> Self {
        Self {
            columns: vec![column.to_string()],
            values: vec![Value::U64(id)],
        }
    }
}

impl Row for MySqlRow {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn get_value_at(&self, index: usize) -> Result<Value> {
        self.values
            .get(index)
            .cloned()
            .ok_or_else(|| Error::ColumnNotFound(format!("#{}", index)))
    }
}
