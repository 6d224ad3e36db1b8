/*!
 * Bounded concurrency for per-item work inside a stage.
 */

use std::future::Future;

use futures::stream::{self, StreamExt};

/// Run `f` over `items` with at most `limit` futures in flight and return
/// the outputs in input order.
///
/// Completion order is unspecified; each output is placed back at the index
/// of its input.
pub async fn map_in_order<I, T, R, F, Fut>(items: I, limit: usize, f: F) -> Vec<R>
where
    I: IntoIterator<Item = T>,
    F: Fn(usize, T) -> Fut,
    Fut: Future<Output = R>,
{
    // Built up front; each future stays idle until `buffer_unordered` polls it
    let futures: Vec<_> = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let future = f(index, item);
            async move { (index, future.await) }
        })
        .collect();

    let mut results: Vec<(usize, R)> = stream::iter(futures)
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    // Sort by index to maintain original order
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, result)| result).collect()
}
