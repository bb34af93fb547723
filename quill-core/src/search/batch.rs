//! Concurrent multi-query search with a concurrency cap.
//!
//! Queries are independent, so they run concurrently under a semaphore.
//! Results come back in query order regardless of completion order.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::warn;

use super::{SearchClient, SearchResult};

/// Results for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResults {
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// Run every query against `client`, at most `max_parallel` at a time.
///
/// A query that exceeds `timeout` contributes an empty list.
pub async fn search_all(
    client: Arc<dyn SearchClient>,
    queries: &[String],
    num_results: usize,
    max_parallel: usize,
    timeout: Duration,
) -> Vec<QueryResults> {
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));

    let tasks = queries.iter().map(|query| {
        let client = Arc::clone(&client);
        let semaphore = Arc::clone(&semaphore);
        let query = query.clone();

        async move {
            let results = match semaphore.acquire().await {
                Ok(_permit) => {
                    match tokio::time::timeout(timeout, client.search(&query, num_results)).await
                    {
                        Ok(results) => results,
                        Err(_) => {
                            warn!(query = %query, timeout_ms = timeout.as_millis() as u64, "search timed out");
                            Vec::new()
                        }
                    }
                }
                Err(_) => Vec::new(),
            };
            QueryResults { query, results }
        }
    });

    join_all(tasks).await
}
