//! Query builder for rdao

use crate::dao::Dao;
use crate::error::{Error, Result};
use crate::executor;
use crate::statement::Statement;
use crate::stream::first;
use crate::traits::{Connection, ConnectionPool, FromRow, RowStream, ToValue};
use crate::value::ValueType;
use futures::TryStreamExt;

/// A query builder that supports fluent parameter binding.
///
/// # Example
///
/// ```ignore
/// use rdao::{Dao, Query};
///
/// async fn find_entity(dao: &Dao<MySqlPool>, id: i64) -> rdao::Result<Option<SomeEntity>> {
///     Query::new("SELECT id, svalue FROM some_entity WHERE id = ?")
///         .bind(id)
///         .fetch_optional(dao)
///         .await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    statement: Statement,
    next_index: usize,
}

impl Query {
    /// Create a new query with the given SQL.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            statement: Statement::new(sql),
            next_index: 0,
        }
    }

    /// Bind a value to the next positional parameter.
    ///
    /// Values are bound in order, replacing `?` placeholders. `None` binds
    /// a NULL.
    pub fn bind<T: ToValue>(mut self, value: T) -> Self {
        self.statement.bind(self.next_index, value);
        self.next_index += 1;
        self
    }

    /// Bind a typed NULL to the next positional parameter.
    pub fn bind_null(mut self, ty: ValueType) -> Self {
        self.statement.bind_null(self.next_index, ty);
        self.next_index += 1;
        self
    }

    /// Bind multiple values to the query.
    ///
    /// This is useful for IN clauses.
    pub fn bind_all<T: ToValue>(mut self, values: &[T]) -> Self {
        for value in values {
            self = self.bind(value);
        }
        self
    }

    /// Bind a value to a named parameter.
    pub fn bind_named<T: ToValue>(mut self, name: &str, value: T) -> Self {
        self.statement.bind_named(name, value);
        self
    }

    /// Get the SQL string.
    pub fn sql(&self) -> &str {
        self.statement.sql()
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn into_statement(self) -> Statement {
        self.statement
    }

    /// Execute the query and yield the affected-row counts.
    pub fn execute<P: ConnectionPool>(self, dao: &Dao<P>) -> RowStream<'static, u64> {
        dao.execute_statement(self.statement)
    }

    /// Execute the query on an already checked-out connection.
    pub fn execute_on<C: Connection>(self, conn: &mut C) -> RowStream<'_, u64> {
        executor::execute(conn, self.statement)
    }

    /// Stream all matching rows.
    pub fn fetch<T, P>(self, dao: &Dao<P>) -> RowStream<'static, T>
    where
        T: FromRow + Send + 'static,
        P: ConnectionPool,
    {
        dao.select_statement(self.statement, |row| T::from_row(row))
    }

    /// Stream all matching rows on an already checked-out connection.
    pub fn fetch_on<'c, T, C>(self, conn: &'c mut C) -> RowStream<'c, T>
    where
        T: FromRow + Send + 'c,
        C: Connection,
    {
        executor::select(conn, self.statement, |row| T::from_row(row))
    }

    /// Fetch all matching rows.
    pub async fn fetch_all<T, P>(self, dao: &Dao<P>) -> Result<Vec<T>>
    where
        T: FromRow + Send + 'static,
        P: ConnectionPool,
    {
        self.fetch(dao).try_collect().await
    }

    /// Fetch the first row, if any.
    pub async fn fetch_optional<T, P>(self, dao: &Dao<P>) -> Result<Option<T>>
    where
        T: FromRow + Send + 'static,
        P: ConnectionPool,
    {
        first(self.fetch(dao)).await
    }

    /// Fetch the first row, failing with [`Error::NotFound`] if there is none.
    pub async fn fetch_one<T, P>(self, dao: &Dao<P>) -> Result<T>
    where
        T: FromRow + Send + 'static,
        P: ConnectionPool,
    {
        let sql = self.statement.sql().to_string();
        self.fetch_optional(dao)
            .await?
            .ok_or_else(|| Error::NotFound(format!("no row for query: {}", sql)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Bound;
    use crate::value::Value;

    #[test]
    fn binds_in_order() {
        let query = Query::new("SELECT * FROM t WHERE a = ? AND b IN (?, ?) AND c = ?")
            .bind(1i64)
            .bind_all(&["x", "y"])
            .bind(None::<i32>);

        let slot = &query.statement().slots()[0];
        assert_eq!(slot.get(0), Some(&Bound::Value(Value::I64(1))));
        assert_eq!(slot.get(2), Some(&Bound::Value(Value::String("y".into()))));
        assert_eq!(slot.get(3), Some(&Bound::Null(ValueType::String)));
    }

    #[test]
    fn typed_null_takes_the_next_position() {
        let query = Query::new("UPDATE t SET a = ?, b = ?")
            .bind_null(ValueType::Date)
            .bind("b");

        let slot = &query.statement().slots()[0];
        assert_eq!(slot.get(0), Some(&Bound::Null(ValueType::Date)));
        assert!(slot.get(1).is_some());
    }
}
