//! Pool and connection traits implemented by database backends

use crate::error::Result;
use crate::statement::Statement;
use crate::traits::{IsolationLevel, Row};
use async_trait::async_trait;
use futures::stream::BoxStream;

/// A lazy, finite, single-pass stream of results.
///
/// Every operation in this crate returns one. Errors end the stream: at most
/// one `Err` is yielded and it is always the last item.
pub type RowStream<'a, T> = BoxStream<'a, Result<T>>;

/// One item of raw driver output.
#[derive(Debug)]
pub enum Segment<R> {
    /// An update count reported by the database (one per executed statement
    /// or per bound parameter slot).
    RowsAffected(u64),
    /// A result row, either selected or holding generated values.
    Row(R),
}

/// One database session checked out of a [`ConnectionPool`].
///
/// A connection is owned by exactly one scope at a time; operations receive it
/// as `&mut`, which keeps statements on it strictly ordered.
#[async_trait]
pub trait Connection: Send + 'static {
    /// The row type yielded by [`Connection::execute`].
    type Row: Row + Send + 'static;

    /// Create a statement for this connection.
    fn create_statement(&self, sql: &str) -> Statement {
        Statement::new(sql)
    }

    /// Execute a statement once with all of its parameter slots.
    ///
    /// For a statement with N slots the driver yields results in slot order.
    /// When generated values were requested, one `Segment::Row` is produced
    /// per inserted row.
    fn execute(&mut self, statement: Statement) -> RowStream<'_, Segment<Self::Row>>;

    /// Start a transaction with the given isolation level.
    async fn begin_transaction(&mut self, level: IsolationLevel) -> Result<()>;

    /// Commit the current transaction.
    async fn commit_transaction(&mut self) -> Result<()>;

    /// Roll back the current transaction.
    async fn rollback_transaction(&mut self) -> Result<()>;
}

/// A pool of database connections.
///
/// Cloning a pool must be cheap and yield a handle to the same pool.
#[async_trait]
pub trait ConnectionPool: Clone + Send + Sync + 'static {
    /// The connection type handed out by this pool.
    type Conn: Connection;

    /// Check out a connection.
    ///
    /// Fails with [`Error::Acquisition`](crate::Error::Acquisition) when the
    /// pool cannot produce one.
    async fn acquire(&self) -> Result<Self::Conn>;

    /// Return a connection to the pool.
    fn release(&self, conn: Self::Conn);
}
