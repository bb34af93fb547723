//! Serper (google.serper.dev) search provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::QuillConfig;
use crate::error::{Error, Result};
use crate::llm::build_http_client;

use super::{SearchClient, SearchResult};

const SERPER_URL: &str = "https://google.serper.dev/search";

/// Search client for the Serper API.
pub struct SerperClient {
    api_key: String,
    url: String,
    http: Client,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperOrganic>,
}

#[derive(Debug, Deserialize)]
struct SerperOrganic {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, config: &QuillConfig) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            url: config
                .search_base_url
                .clone()
                .unwrap_or_else(|| SERPER_URL.to_string()),
            http: build_http_client(config.search_timeout())?,
        })
    }

    /// Build from configuration, failing when no API key is configured.
    pub fn from_config(config: &QuillConfig) -> Result<Self> {
        let key = config
            .search_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("SERPER_API_KEY not found in environment"))?;
        Self::new(key, config)
    }

    async fn try_search(&self, query: &str, num_results: usize) -> Result<Vec<SearchResult>> {
        let response = self
            .http
            .post(&self.url)
            .header("X-API-KEY", &self.api_key)
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await
            .map_err(|e| Error::Search(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Search(format!("status {}", status)));
        }

        let body: SerperResponse = response
            .json()
            .await
            .map_err(|e| Error::Search(format!("invalid response: {}", e)))?;

        Ok(body
            .organic
            .into_iter()
            .take(num_results)
            .map(|item| SearchResult {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        match self.try_search(query, num_results).await {
            Ok(results) => {
                debug!(query, count = results.len(), "search complete");
                results
            }
            Err(e) => {
                warn!(query, error = %e, "search failed, continuing with no results");
                Vec::new()
            }
        }
    }
}
