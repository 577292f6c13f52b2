//! Batch statements for rdao

use crate::dao::Dao;
use crate::error::{Error, Result};
use crate::executor;
use crate::params::ParameterSet;
use crate::statement::Statement;
use crate::stream::failed;
use crate::traits::{Connection, ConnectionPool, Row, RowStream, Segment, ToParams};
use async_stream::stream;
use futures::StreamExt;
use tracing::debug;

/// Items bound up front into one parameter set each.
///
/// Slot `i` holds the parameters of item `i`, and item `i` is kept as the
/// correlation token for result `i`.
#[derive(Debug)]
pub struct BatchJob<T> {
    slots: Vec<ParameterSet>,
    tokens: Vec<T>,
}

impl<T> BatchJob<T> {
    /// Bind every item in iteration order.
    pub fn bind<I, B>(items: I, mut binder: B) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        B: FnMut(&mut ParameterSet, &T) -> Result<()>,
    {
        let items = items.into_iter();
        let (lower, _) = items.size_hint();
        let mut job = Self {
            slots: Vec::with_capacity(lower),
            tokens: Vec::with_capacity(lower),
        };
        for item in items {
            let mut params = ParameterSet::new();
            binder(&mut params, &item)?;
            job.slots.push(params);
            job.tokens.push(item);
        }
        Ok(job)
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn slots(&self) -> &[ParameterSet] {
        &self.slots
    }

    /// Load the slots into `statement` and hand back the tokens.
    ///
    /// A new slot is added only when another item follows, so N items
    /// produce exactly N slots.
    pub fn into_statement(self, mut statement: Statement) -> (Statement, Vec<T>) {
        let mut slots = self.slots.into_iter().peekable();
        while let Some(slot) = slots.next() {
            *statement.parameters_mut() = slot;
            if slots.peek().is_some() {
                statement.add();
            }
        }
        (statement, self.tokens)
    }
}

/// Execute `statement` once for all `items` and yield the affected-row
/// counts, one per item.
pub fn execute<'c, C, T, B>(
    conn: &'c mut C,
    statement: Statement,
    items: Vec<T>,
    binder: B,
) -> RowStream<'c, u64>
where
    C: Connection,
    B: FnMut(&mut ParameterSet, &T) -> Result<()>,
{
    if items.is_empty() {
        return Box::pin(futures::stream::empty());
    }
    let job = match BatchJob::bind(items, binder) {
        Ok(job) => job,
        Err(e) => return failed(e),
    };
    let (statement, _) = job.into_statement(statement);
    debug!(slots = statement.slots().len(), "executing batch");
    executor::execute(conn, statement)
}

/// Execute an insert once for all `items` and map each generated-value row
/// together with the item it belongs to.
///
/// Result `i` is mapped with item `i`. If the driver returns a different
/// number of rows than there are items, the stream ends with
/// [`Error::BatchCorrelation`].
pub fn insert<'c, C, T, R, B, M>(
    conn: &'c mut C,
    statement: Statement,
    items: Vec<T>,
    binder: B,
    mapper: M,
) -> RowStream<'c, R>
where
    C: Connection,
    T: Send + 'c,
    R: Send + 'c,
    B: FnMut(&mut ParameterSet, &T) -> Result<()>,
    M: Fn(&dyn Row, T) -> Result<R> + Send + 'c,
{
    if items.is_empty() {
        return Box::pin(futures::stream::empty());
    }
    let job = match BatchJob::bind(items, binder) {
        Ok(job) => job,
        Err(e) => return failed(e),
    };
    let (statement, tokens) = job.into_statement(statement);
    if let Err(e) = statement.validate() {
        return failed(e);
    }
    let inputs = tokens.len();
    debug!(slots = inputs, "executing batch insert");

    Box::pin(stream! {
        let mut rows = conn.execute(statement);
        let mut tokens = tokens.into_iter();
        let mut results = 0usize;
        while let Some(segment) = rows.next().await {
            let row = match segment {
                Ok(Segment::Row(row)) => row,
                Ok(Segment::RowsAffected(_)) => continue,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            results += 1;
            let token = match tokens.next() {
                Some(token) => token,
                None => {
                    yield Err(Error::BatchCorrelation { inputs, results });
                    return;
                }
            };
            match mapper(&row, token) {
                Ok(value) => yield Ok(value),
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }
        if results != inputs {
            yield Err(Error::BatchCorrelation { inputs, results });
        }
    })
}

/// A batch insert built from a [`ToParams`] type.
///
/// Generates `INSERT INTO table (columns) VALUES (?, ...)` from the type's
/// insert columns and binds one slot per entity.
///
/// # Example
///
/// ```ignore
/// use rdao::BatchInsert;
///
/// let ids: Vec<i64> = BatchInsert::new("some_entity")
///     .returning("id")
///     .execute_returning(&dao, entities, |row, _entity| row.get("id"))
///     .try_collect()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct BatchInsert {
    table: String,
    generated: Option<String>,
}

impl BatchInsert {
    /// Create a new batch insert for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            generated: None,
        }
    }

    /// Return the given generated column for each inserted row.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.generated = Some(column.into());
        self
    }

    /// The INSERT statement for one entity of type `T`.
    pub fn sql<T: ToParams>(&self) -> String {
        let column_names = T::insert_column_names();
        let columns = column_names
            .iter()
            .map(|c| format!("`{}`", c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = column_names
            .iter()
            .map(|_| "?")
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO `{}` ({}) VALUES ({})",
            self.table, columns, placeholders
        )
    }

    pub fn statement<T: ToParams>(&self) -> Statement {
        let statement = Statement::new(self.sql::<T>());
        match &self.generated {
            Some(column) => statement.return_generated_values([column.clone()]),
            None => statement,
        }
    }

    /// Insert all entities and yield one affected-row count per entity.
    pub fn execute<P, T>(self, dao: &Dao<P>, entities: Vec<T>) -> RowStream<'static, u64>
    where
        P: ConnectionPool,
        T: ToParams + Send + 'static,
    {
        if T::insert_column_names().is_empty() {
            return failed(Error::binding(self.table, "no insertable columns"));
        }
        let statement = self.statement::<T>();
        dao.batch_execute_statement(statement, entities, |params, entity: &T| {
            entity.bind_insert(params);
            Ok(())
        })
    }

    /// Insert all entities and map each generated-value row with its entity.
    pub fn execute_returning<P, T, R, M>(
        self,
        dao: &Dao<P>,
        entities: Vec<T>,
        mapper: M,
    ) -> RowStream<'static, R>
    where
        P: ConnectionPool,
        T: ToParams + Send + 'static,
        R: Send + 'static,
        M: Fn(&dyn Row, T) -> Result<R> + Send + 'static,
    {
        if T::insert_column_names().is_empty() {
            return failed(Error::binding(self.table, "no insertable columns"));
        }
        let statement = self.statement::<T>();
        dao.batch_insert(
            move |_| statement,
            entities,
            |params, entity: &T| {
                entity.bind_insert(params);
                Ok(())
            },
            mapper,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn job_keeps_items_in_order() {
        let job = BatchJob::bind(vec!["a", "b", "c"], |params, item| {
            params.push(*item);
            Ok(())
        })
        .unwrap();

        assert_eq!(job.len(), 3);
        let bound: Vec<Value> = job
            .slots()
            .iter()
            .map(|slot| slot.get(0).unwrap().to_value())
            .collect();
        assert_eq!(bound, vec![Value::from("a"), Value::from("b"), Value::from("c")]);
    }

    #[test]
    fn loading_a_job_adds_no_trailing_slot() {
        let job = BatchJob::bind(1..=4i64, |params, item| {
            params.push(*item);
            Ok(())
        })
        .unwrap();

        let (statement, tokens) = job.into_statement(Statement::new("INSERT INTO t (v) VALUES (?)"));
        assert_eq!(statement.slots().len(), 4);
        assert_eq!(tokens, vec![1, 2, 3, 4]);
        assert!(statement.validate().is_ok());
    }

    #[test]
    fn binder_error_aborts_the_job() {
        let result = BatchJob::bind(vec![1, 2], |_, item| {
            if *item == 2 {
                Err(Error::binding("0", "rejected"))
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(Error::Binding { .. })));
    }

    struct Pair {
        a: i32,
        b: String,
    }

    impl ToParams for Pair {
        fn insert_column_names() -> &'static [&'static str] {
            &["a", "b"]
        }

        fn insert_values(&self) -> Vec<Value> {
            vec![Value::from(self.a), Value::from(self.b.clone())]
        }

        fn all_column_names() -> &'static [&'static str] {
            &["a", "b"]
        }

        fn all_values(&self) -> Vec<Value> {
            self.insert_values()
        }
    }

    #[test]
    fn batch_insert_builds_single_row_statement() {
        let insert = BatchInsert::new("pairs").returning("id");
        assert_eq!(
            insert.sql::<Pair>(),
            "INSERT INTO `pairs` (`a`, `b`) VALUES (?, ?)"
        );
        assert!(insert.statement::<Pair>().returns_generated_values());

        let mut params = ParameterSet::new();
        Pair { a: 1, b: "x".into() }.bind_insert(&mut params);
        assert_eq!(params.len(), 2);
    }
}
