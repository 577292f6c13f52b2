//! Helpers for consuming result streams

use crate::error::{Error, Result};
use crate::traits::RowStream;
use async_stream::stream;
use futures::{Stream, StreamExt};

/// Adapt a stream to produce exactly one value.
///
/// The value is held back until the source ends. No value yields
/// [`Error::EmptyResult`]; a second value yields [`Error::MultipleResults`].
/// Either error ends the stream, so inside a transaction it causes a
/// rollback.
pub fn exactly_one<'a, T: Send + 'a>(source: RowStream<'a, T>) -> RowStream<'a, T> {
    Box::pin(stream! {
        let mut source = source;
        let first = match source.next().await {
            Some(Ok(value)) => value,
            Some(Err(e)) => {
                yield Err(e);
                return;
            }
            None => {
                yield Err(Error::EmptyResult);
                return;
            }
        };
        match source.next().await {
            None => yield Ok(first),
            Some(Ok(_)) => yield Err(Error::MultipleResults),
            Some(Err(e)) => yield Err(e),
        }
    })
}

/// Consume a stream that must produce exactly one value.
pub async fn single<'a, T: Send + 'a>(source: RowStream<'a, T>) -> Result<T> {
    exactly_one(source)
        .next()
        .await
        .unwrap_or(Err(Error::EmptyResult))
}

/// Take the first value of a stream, if any, and drop the rest.
///
/// Dropping the remainder cancels it, which releases any connection the
/// stream holds.
pub async fn first<S, T>(source: S) -> Result<Option<T>>
where
    S: Stream<Item = Result<T>>,
{
    let mut source = std::pin::pin!(source);
    source.next().await.transpose()
}

/// Box a stream of results into a [`RowStream`].
///
/// Pins the error type, which `try_stream!` blocks cannot infer on their own.
pub fn boxed<'a, T, S>(source: S) -> RowStream<'a, T>
where
    S: Stream<Item = Result<T>> + Send + 'a,
{
    Box::pin(source)
}

/// A stream that yields one error and ends.
pub(crate) fn failed<'a, T: Send + 'a>(err: Error) -> RowStream<'a, T> {
    Box::pin(futures::stream::once(async move { Err(err) }))
}
