//! Test doubles for the two external collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::llm::{
    CompletionRequest, CompletionResponse, LLMClient, Provider, StopReason, TokenUsage,
};
use crate::search::{SearchClient, SearchResult};

/// Canned-response LLM client that records every request.
pub struct MockLLMClient {
    response: String,
    failure: Option<String>,
    fail_on_call: Option<usize>,
    delay: Option<Duration>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockLLMClient {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            failure: None,
            fail_on_call: None,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fails every call.
    pub fn failing(message: impl Into<String>) -> Self {
        let mut client = Self::new("");
        client.failure = Some(message.into());
        client
    }

    /// Fails only the `n`th call (1-based).
    pub fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let call = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request);
            requests.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(Error::llm_api("mock", message.clone()));
        }
        if self.fail_on_call == Some(call) {
            return Err(Error::llm_api("mock", format!("call {} failed", call)));
        }

        Ok(CompletionResponse {
            id: format!("mock-{}", call),
            model: "mock-model".to_string(),
            content: self.response.clone(),
            stop_reason: Some(StopReason::EndTurn),
            usage: TokenUsage::default(),
            timestamp: Utc::now(),
        })
    }

    fn provider(&self) -> Provider {
        Provider::Groq
    }
}

type DelayFn = Box<dyn Fn(&str) -> Duration + Send + Sync>;

enum Canned {
    /// `n` generated results per query
    Generated(usize),
    /// One result per snippet, the same for every query
    Snippets(Vec<String>),
}

/// Search stub with call accounting.
pub struct StubSearch {
    canned: Canned,
    delay: Option<DelayFn>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    last_num_results: Mutex<Option<usize>>,
}

impl StubSearch {
    fn with_canned(canned: Canned) -> Self {
        Self {
            canned,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            last_num_results: Mutex::new(None),
        }
    }

    pub fn with_results(n: usize) -> Self {
        Self::with_canned(Canned::Generated(n))
    }

    pub fn with_snippets(snippets: &[&str]) -> Self {
        Self::with_canned(Canned::Snippets(
            snippets.iter().map(|s| s.to_string()).collect(),
        ))
    }

    pub fn empty() -> Self {
        Self::with_results(0)
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_fn(move |_| delay)
    }

    pub fn with_delay_fn(mut self, f: impl Fn(&str) -> Duration + Send + Sync + 'static) -> Self {
        self.delay = Some(Box::new(f));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn last_num_results(&self) -> Option<usize> {
        *self.last_num_results.lock().unwrap()
    }

    fn results_for(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        match &self.canned {
            Canned::Generated(n) => (0..(*n).min(num_results))
                .map(|i| {
                    SearchResult::new(
                        format!("{} result {}", query, i + 1),
                        format!("https://example.com/{}/{}", query.replace(' ', "-"), i + 1),
                        format!("Snippet {} about {}.", i + 1, query),
                    )
                })
                .collect(),
            Canned::Snippets(snippets) => snippets
                .iter()
                .take(num_results)
                .enumerate()
                .map(|(i, snippet)| {
                    SearchResult::new(
                        format!("Source {}", i + 1),
                        format!("https://source{}.example", i + 1),
                        snippet.clone(),
                    )
                })
                .collect(),
        }
    }
}

#[async_trait]
impl SearchClient for StubSearch {
    async fn search(&self, query: &str, num_results: usize) -> Vec<SearchResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_num_results.lock().unwrap() = Some(num_results);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(query)).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.results_for(query, num_results)
    }
}
