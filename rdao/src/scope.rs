//! Connection scopes with guaranteed release

use crate::error::{Error, Result};
use crate::traits::{Connection, ConnectionPool, IsolationLevel, RowStream};
use async_stream::stream;
use futures::StreamExt;
use tracing::{debug, warn};

/// A connection checked out of a pool for the lifetime of one operation.
///
/// The connection goes back to the pool exactly once: on [`release`], or
/// when the guard is dropped. Dropping the guard with a transaction still
/// open rolls the transaction back on the current Tokio runtime before the
/// connection is returned.
///
/// [`release`]: ScopedConnection::release
pub struct ScopedConnection<P: ConnectionPool> {
    pool: P,
    conn: Option<P::Conn>,
    transaction_open: bool,
}

impl<P: ConnectionPool> ScopedConnection<P> {
    /// Check out a connection from the pool.
    pub async fn acquire(pool: &P) -> Result<Self> {
        let conn = pool.acquire().await?;
        debug!("acquired connection");
        Ok(Self {
            pool: pool.clone(),
            conn: Some(conn),
            transaction_open: false,
        })
    }

    /// The live connection.
    ///
    /// Fails once the connection has been released.
    pub fn connection(&mut self) -> Result<&mut P::Conn> {
        self.conn
            .as_mut()
            .ok_or_else(|| Error::Connection("connection already released".to_string()))
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction_open
    }

    /// Begin a transaction on the scoped connection.
    pub async fn begin(&mut self, level: IsolationLevel) -> Result<()> {
        self.connection()?.begin_transaction(level).await?;
        self.transaction_open = true;
        debug!(level = level.as_sql(), "transaction started");
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// A failed commit is reported as [`Error::Commit`] and is not followed
    /// by a rollback.
    pub async fn commit(&mut self) -> Result<()> {
        self.transaction_open = false;
        self.connection()?
            .commit_transaction()
            .await
            .map_err(|e| Error::Commit(Box::new(e)))?;
        debug!("transaction committed");
        Ok(())
    }

    /// Roll back the open transaction.
    pub async fn rollback(&mut self) -> Result<()> {
        self.transaction_open = false;
        self.connection()?.rollback_transaction().await?;
        debug!("transaction rolled back");
        Ok(())
    }

    /// Roll back after `cause` and return the error to report.
    ///
    /// `cause` stays the primary error; a failed rollback is attached to it.
    pub async fn rollback_after(&mut self, cause: Error) -> Error {
        match self.rollback().await {
            Ok(()) => cause,
            Err(rollback) => {
                warn!(error = %rollback, "rollback failed");
                Error::Rollback {
                    cause: Box::new(cause),
                    rollback: Box::new(rollback),
                }
            }
        }
    }

    /// Return the connection to the pool.
    ///
    /// Does nothing if it was already released.
    pub fn release(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("released connection");
            self.pool.release(conn);
        }
    }
}

impl<P: ConnectionPool> Drop for ScopedConnection<P> {
    fn drop(&mut self) {
        if !self.transaction_open {
            self.release();
            return;
        }

        let Some(mut conn) = self.conn.take() else {
            return;
        };
        let pool = self.pool.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!("rolling back abandoned transaction");
                handle.spawn(async move {
                    if let Err(e) = conn.rollback_transaction().await {
                        warn!(error = %e, "rollback of abandoned transaction failed");
                    }
                    pool.release(conn);
                });
            }
            Err(_) => {
                // MySqlPool resets returned connections, which ends the transaction.
                warn!("no runtime to roll back abandoned transaction, releasing connection");
                pool.release(conn);
            }
        }
    }
}

/// Run `action` on a connection checked out from `pool`.
///
/// The connection is released when the returned stream ends, fails, or is
/// dropped. The first error from `action` ends the stream; it is yielded
/// after the connection has been released.
pub fn with_connection<P, T, F>(pool: &P, action: F) -> RowStream<'static, T>
where
    P: ConnectionPool,
    T: Send + 'static,
    F: for<'c> FnOnce(&'c mut P::Conn) -> RowStream<'c, T> + Send + 'static,
{
    let pool = pool.clone();
    Box::pin(stream! {
        let mut scope = match ScopedConnection::acquire(&pool).await {
            Ok(scope) => scope,
            Err(e) => {
                yield Err(e);
                return;
            }
        };

        let mut failure = None;
        match scope.connection() {
            Ok(conn) => {
                let mut items = action(conn);
                while let Some(item) = items.next().await {
                    match item {
                        Ok(value) => yield Ok(value),
                        Err(e) => {
                            failure = Some(e);
                            break;
                        }
                    }
                }
            }
            Err(e) => failure = Some(e),
        }

        scope.release();
        if let Some(e) = failure {
            yield Err(e);
        }
    })
}
