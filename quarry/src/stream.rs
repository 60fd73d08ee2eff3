//!
//! Stream-shaped query results.
//!

use futures_util::stream::{self, BoxStream, StreamExt};

/// A query result delivered as a stream of rows.
pub type RowStream<T> = BoxStream<'static, T>;

pub fn from_vec<T>(items: Vec<T>) -> RowStream<T>
where
    T: Send + 'static,
{
    stream::iter(items).boxed()
}
