//! Transaction scopes

use crate::error::Error;
use crate::scope::ScopedConnection;
use crate::traits::{ConnectionPool, IsolationLevel, RowStream};
use async_stream::stream;
use futures::StreamExt;

/// Run `action` inside a transaction on one connection checked out from
/// `pool`.
///
/// Values from `action` are yielded as they are produced. When `action`
/// completes, the transaction is committed before the stream ends; a failed
/// commit ends the stream with [`Error::Commit`]. When `action` fails, the
/// transaction is rolled back and the original error is yielded (wrapped in
/// [`Error::Rollback`] if the rollback failed as well).
///
/// Dropping the stream before it ends rolls the transaction back. Exactly one
/// of commit or rollback is issued for every transaction that began.
///
/// # Example
///
/// ```ignore
/// let updated = transaction::in_transaction(&pool, IsolationLevel::ReadCommitted, move |conn| {
///     stream::boxed(try_stream! {
///         let existing = stream::first(executor::select(&mut *conn, find, mapper)).await?;
///         // ...
///     })
/// });
/// ```
pub fn in_transaction<P, T, F>(pool: &P, level: IsolationLevel, action: F) -> RowStream<'static, T>
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

        if let Err(e) = scope.begin(level).await {
            scope.release();
            yield Err(e);
            return;
        }

        let mut failure: Option<Error> = None;
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

        let error = match failure {
            None => scope.commit().await.err(),
            Some(cause) => Some(scope.rollback_after(cause).await),
        };
        scope.release();
        if let Some(e) = error {
            yield Err(e);
        }
    })
}
