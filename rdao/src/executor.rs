//! Statement execution on an acquired connection

use crate::error::Result;
use crate::statement::Statement;
use crate::stream::failed;
use crate::traits::{Connection, Row, RowStream, Segment};
use futures::{future, TryStreamExt};
use tracing::trace;

/// Execute a statement and yield every affected-row count it reports.
///
/// Multi-statement scripts and batches report one count per statement or
/// slot, in order. Result rows, if any, are discarded.
pub fn execute<'c, C>(conn: &'c mut C, statement: Statement) -> RowStream<'c, u64>
where
    C: Connection,
{
    if let Err(e) = statement.validate() {
        return failed(e);
    }
    trace!(sql = statement.sql(), "execute");
    Box::pin(conn.execute(statement).try_filter_map(|segment| {
        future::ready(Ok(match segment {
            Segment::RowsAffected(count) => Some(count),
            Segment::Row(_) => None,
        }))
    }))
}

/// Execute a query and map each row through `mapper` as it arrives.
///
/// Rows are yielded in cursor order. A mapper error ends the stream.
pub fn select<'c, C, T, M>(conn: &'c mut C, statement: Statement, mapper: M) -> RowStream<'c, T>
where
    C: Connection,
    T: Send + 'c,
    M: Fn(&dyn Row) -> Result<T> + Send + 'c,
{
    if let Err(e) = statement.validate() {
        return failed(e);
    }
    trace!(sql = statement.sql(), "select");
    Box::pin(conn.execute(statement).try_filter_map(move |segment| {
        future::ready(match segment {
            Segment::Row(row) => mapper(&row).map(Some),
            Segment::RowsAffected(_) => Ok(None),
        })
    }))
}
