//! Fan-out join disciplines.
//!
//! Two ways to run N independent async operations:
//!
//! - [`wait_all`]: nothing is exposed until every branch resolves, and
//!   the first failure aborts the whole batch. Used for the download
//!   fan-out where a single missing asset invalidates the composite.
//! - [`drain_as_completed`]: results are consumed in completion order,
//!   whichever finishes first. Infallible by construction; tasks that
//!   can fail convert their own errors into sentinel values. Used for
//!   the fail-soft job-creation fan-out.
//!
//! Completion order in [`drain_as_completed`] is unspecified; callers
//! restore ordering afterwards by sorting on storyboard index.

use std::future::Future;

use futures::stream::{FuturesUnordered, StreamExt};

/// Run every future and fail the batch on the first error.
pub async fn wait_all<I, F, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, E>>,
{
    futures::future::try_join_all(futures).await
}

/// Run every future concurrently and collect results as each one
/// finishes, regardless of dispatch order.
pub async fn drain_as_completed<I, F, T>(futures: I) -> Vec<T>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = T>,
{
    let mut set: FuturesUnordered<F> = futures.into_iter().collect();
    let mut results = Vec::with_capacity(set.len());

    while let Some(result) = set.next().await {
        results.push(result);
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_wait_all_returns_everything() {
        let results = wait_all((0..4).map(|i| async move {
            tokio::time::sleep(Duration::from_millis(10 * (4 - i))).await;
            Ok::<_, String>(i)
        }))
        .await
        .unwrap();

        // Dispatch order is preserved even though completion order reversed
        assert_eq!(results, vec![0, 1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_all_aborts_on_first_failure() {
        let err = wait_all((0..3).map(|i| async move {
            if i == 1 {
                Err(format!("branch {} failed", i))
            } else {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(i)
            }
        }))
        .await
        .unwrap_err();

        assert_eq!(err, "branch 1 failed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_yields_in_completion_order() {
        let delays = [30u64, 10, 20];
        let results = drain_as_completed(delays.iter().enumerate().map(|(i, d)| async move {
            tokio::time::sleep(Duration::from_millis(*d)).await;
            i
        }))
        .await;

        assert_eq!(results, vec![1, 2, 0]);
    }

    #[tokio::test]
    async fn test_drain_on_empty_input() {
        let results: Vec<u32> = drain_as_completed(Vec::<std::future::Ready<u32>>::new()).await;
        assert!(results.is_empty());
    }
}
