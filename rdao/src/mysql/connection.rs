//! MySQL connection implementation

use crate::error::{Error, Result};
use crate::statement::Statement;
use crate::stream;
use crate::traits::{Connection, IsolationLevel, RowStream, Segment};
use async_stream::try_stream;
use async_trait::async_trait;
use mysql_async::prelude::*;
use mysql_async::Conn;
use tracing::trace;

use super::row::MySqlRow;
use super::types::to_mysql_params;

/// One MySQL session checked out of a [`MySqlPool`](super::MySqlPool).
///
/// Statements without parameters run through the text protocol, so a
/// parameterless script may hold several statements separated by `;`.
/// Everything else is prepared once and executed once per parameter slot.
pub struct MySqlConnection {
    inner: Conn,
}

impl MySqlConnection {
    pub(crate) fn new(inner: Conn) -> Self {
        Self { inner }
    }

    /// Get a reference to the underlying mysql_async connection.
    pub fn inner(&mut self) -> &mut Conn {
        &mut self.inner
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    type Row = MySqlRow;

    fn execute(&mut self, statement: Statement) -> RowStream<'_, Segment<MySqlRow>> {
        let conn = &mut self.inner;
        stream::boxed(try_stream! {
            statement.validate()?;
            let generated = statement.generated_columns().first().cloned();

            if statement.is_simple() {
                trace!(sql = statement.sql(), "text query");
                let mut result = conn.query_iter(statement.sql()).await?;
                loop {
                    if result.columns_ref().is_empty() {
                        let segments =
                            update_segments(result.affected_rows(), result.last_insert_id(), None)?;
                        for segment in segments {
                            yield segment;
                        }
                        // Step past the update count to the next set, if any.
                        if !result.is_empty() {
                            if let Some(row) = result.next().await? {
                                yield Segment::Row(MySqlRow::from_mysql_row(row)?);
                            }
                        }
                    } else {
                        while let Some(row) = result.next().await? {
                            yield Segment::Row(MySqlRow::from_mysql_row(row)?);
                        }
                    }
                    if result.is_empty() {
                        break;
                    }
                }
            } else {
                trace!(sql = statement.sql(), slots = statement.slots().len(), "prepared statement");
                let prepared = conn.prep(statement.sql()).await?;
                for slot in statement.slots() {
                    let params = to_mysql_params(slot)?;
                    let mut result = conn.exec_iter(prepared.clone(), params).await?;
                    if result.columns_ref().is_empty() {
                        let segments = update_segments(
                            result.affected_rows(),
                            result.last_insert_id(),
                            generated.as_deref(),
                        )?;
                        result.drop_result().await?;
                        for segment in segments {
                            yield segment;
                        }
                    } else {
                        while let Some(row) = result.next().await? {
                            yield Segment::Row(MySqlRow::from_mysql_row(row)?);
                        }
                    }
                }
            }
        })
    }

    async fn begin_transaction(&mut self, level: IsolationLevel) -> Result<()> {
        for sql in begin_statements(level) {
            self.inner.query_drop(sql).await?;
        }
        Ok(())
    }

    async fn commit_transaction(&mut self) -> Result<()> {
        self.inner.query_drop("COMMIT").await?;
        Ok(())
    }

    async fn rollback_transaction(&mut self) -> Result<()> {
        self.inner.query_drop("ROLLBACK").await?;
        Ok(())
    }
}

/// The statements `Conn::start_transaction` sends for an isolation level.
///
/// They run directly on the session because a `mysql_async::Transaction`
/// borrows the `Conn` and cannot outlive the call that opened it.
fn begin_statements(level: IsolationLevel) -> [String; 2] {
    [
        format!("SET TRANSACTION ISOLATION LEVEL {}", level.as_sql()),
        "START TRANSACTION".to_string(),
    ]
}

/// Segments reported by a result without columns.
///
/// Yields the update count, or, when a generated column was requested, one
/// row per affected row holding consecutive keys starting at the last insert
/// id.
fn update_segments(
    affected: u64,
    last_insert_id: Option<u64>,
    generated: Option<&str>,
) -> Result<Vec<Segment<MySqlRow>>> {
    match generated {
        Some(column) if affected > 0 => {
            let first_id = last_insert_id
                .ok_or_else(|| Error::Execution("no generated key returned".to_string()))?;
            Ok((0..affected)
                .map(|offset| Segment::Row(MySqlRow::generated(column, first_id + offset)))
                .collect())
        }
        _ => Ok(vec![Segment::RowsAffected(affected)]),
    }
}
