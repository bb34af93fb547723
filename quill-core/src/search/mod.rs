//! Web-search collaborator.
//!
//! [`SearchClient`] implementations never fail: transport problems are
//! logged and reported as an empty result list so stages degrade instead
//! of aborting the run.

mod batch;
mod serper;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub use batch::{search_all, QueryResults};
pub use serper::SerperClient;

/// A single ranked search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Query in, ranked snippets out.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Return up to `num_results` results for `query`, best first.
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult>;
}

/// Render one query's results the way the search stage feeds them to the model.
pub fn format_results_text(query: &str, results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No results found.".to_string();
    }

    let mut output = format!("Search Results for: '{}'\n\n", query);
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(output, "{}. {}", i + 1, result.title);
        let _ = writeln!(output, "   URL: {}", result.link);
        let _ = writeln!(output, "   {}\n", result.snippet);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_empty_results() {
        assert_eq!(format_results_text("anything", &[]), "No results found.");
    }

    #[test]
    fn test_format_numbered_results() {
        let results = vec![
            SearchResult::new("First", "https://a.example", "alpha"),
            SearchResult::new("Second", "https://b.example", "beta"),
        ];
        let text = format_results_text("tides", &results);

        assert!(text.starts_with("Search Results for: 'tides'\n\n"));
        assert!(text.contains("1. First\n   URL: https://a.example\n   alpha\n"));
        assert!(text.contains("2. Second\n"));
    }
}
