//! Runtime configuration for the pipeline and its collaborators.
//!
//! Configuration is plain data with sensible defaults. Secrets and a few
//! operational knobs can be picked up from the environment via
//! [`QuillConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Coarse research-effort selector.
///
/// Controls how many search queries the plan issues and how long the
/// article should be. It never changes which stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Shallow,
    #[default]
    Medium,
    Deep,
}

impl Depth {
    /// All accepted depth values, in increasing effort.
    pub const ALL: [Depth; 3] = [Depth::Shallow, Depth::Medium, Depth::Deep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shallow => "shallow",
            Self::Medium => "medium",
            Self::Deep => "deep",
        }
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Depth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "shallow" => Ok(Self::Shallow),
            "medium" => Ok(Self::Medium),
            "deep" => Ok(Self::Deep),
            other => Err(Error::config(format!(
                "invalid depth '{}', expected one of: shallow, medium, deep",
                other
            ))),
        }
    }
}

/// The six agents that drive the pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    ResearchCoordinator,
    WebSearcher,
    DataAnalyst,
    ContentWriter,
    FactChecker,
    Editor,
}

impl AgentKind {
    /// Default sampling temperature for this agent.
    pub fn default_temperature(&self) -> f64 {
        match self {
            Self::ResearchCoordinator => 0.3,
            Self::WebSearcher => 0.2,
            Self::DataAnalyst => 0.4,
            Self::ContentWriter => 0.7,
            Self::FactChecker => 0.2,
            Self::Editor => 0.5,
        }
    }
}

/// Per-depth values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDepth<T> {
    pub shallow: T,
    pub medium: T,
    pub deep: T,
}

impl<T: Copy> PerDepth<T> {
    pub fn get(&self, depth: Depth) -> T {
        match depth {
            Depth::Shallow => self.shallow,
            Depth::Medium => self.medium,
            Depth::Deep => self.deep,
        }
    }
}

/// Temperatures keyed by agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperatures {
    pub research_coordinator: f64,
    pub web_searcher: f64,
    pub data_analyst: f64,
    pub content_writer: f64,
    pub fact_checker: f64,
    pub editor: f64,
}

impl Default for Temperatures {
    fn default() -> Self {
        Self {
            research_coordinator: AgentKind::ResearchCoordinator.default_temperature(),
            web_searcher: AgentKind::WebSearcher.default_temperature(),
            data_analyst: AgentKind::DataAnalyst.default_temperature(),
            content_writer: AgentKind::ContentWriter.default_temperature(),
            fact_checker: AgentKind::FactChecker.default_temperature(),
            editor: AgentKind::Editor.default_temperature(),
        }
    }
}

impl Temperatures {
    pub fn for_agent(&self, agent: AgentKind) -> f64 {
        match agent {
            AgentKind::ResearchCoordinator => self.research_coordinator,
            AgentKind::WebSearcher => self.web_searcher,
            AgentKind::DataAnalyst => self.data_analyst,
            AgentKind::ContentWriter => self.content_writer,
            AgentKind::FactChecker => self.fact_checker,
            AgentKind::Editor => self.editor,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuillConfig {
    /// API key for the text-generation provider
    #[serde(skip_serializing)]
    pub llm_api_key: Option<String>,
    /// Base URL override for the text-generation provider
    pub llm_base_url: Option<String>,
    /// Model used for every generation call
    pub model: String,
    /// Maximum tokens per generation
    pub max_tokens: u32,
    /// API key for the search provider
    #[serde(skip_serializing)]
    pub search_api_key: Option<String>,
    /// Base URL override for the search provider
    pub search_base_url: Option<String>,
    /// Per-agent sampling temperatures
    pub temperatures: Temperatures,
    /// Search results requested per query
    pub results_per_query: usize,
    /// Target article length in words
    pub target_word_count: PerDepth<usize>,
    /// Timeout for a single generation call, in seconds
    pub generation_timeout_secs: u64,
    /// Timeout for a single search call, in seconds
    pub search_timeout_secs: u64,
    /// Maximum number of search queries in flight at once
    pub search_concurrency: usize,
}

impl Default for QuillConfig {
    fn default() -> Self {
        Self {
            llm_api_key: None,
            llm_base_url: None,
            model: "openai/gpt-oss-120b".to_string(),
            max_tokens: 4096,
            search_api_key: None,
            search_base_url: None,
            temperatures: Temperatures::default(),
            results_per_query: 3,
            target_word_count: PerDepth {
                shallow: 500,
                medium: 1000,
                deep: 1500,
            },
            generation_timeout_secs: 120,
            search_timeout_secs: 30,
            search_concurrency: 4,
        }
    }
}

impl QuillConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            llm_api_key: std::env::var("GROQ_API_KEY").ok(),
            llm_base_url: std::env::var("QUILL_LLM_BASE_URL").ok(),
            model: std::env::var("QUILL_MODEL").unwrap_or(defaults.model),
            search_api_key: std::env::var("SERPER_API_KEY").ok(),
            generation_timeout_secs: std::env::var("QUILL_GENERATION_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.generation_timeout_secs),
            search_concurrency: std::env::var("QUILL_SEARCH_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.search_concurrency),
            ..defaults
        }
    }

    pub fn with_llm_api_key(mut self, key: impl Into<String>) -> Self {
        self.llm_api_key = Some(key.into());
        self
    }

    pub fn with_search_api_key(mut self, key: impl Into<String>) -> Self {
        self.search_api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_results_per_query(mut self, n: usize) -> Self {
        self.results_per_query = n;
        self
    }

    pub fn with_generation_timeout(mut self, secs: u64) -> Self {
        self.generation_timeout_secs = secs;
        self
    }

    pub fn with_search_concurrency(mut self, max: usize) -> Self {
        self.search_concurrency = max.max(1);
        self
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }

    pub fn search_timeout(&self) -> Duration {
        Duration::from_secs(self.search_timeout_secs)
    }

    /// Check that everything needed to talk to the real providers is present.
    pub fn validate(&self) -> Result<()> {
        if self.llm_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::config("GROQ_API_KEY not found in environment"));
        }
        if self.search_api_key.as_deref().map_or(true, str::is_empty) {
            return Err(Error::config("SERPER_API_KEY not found in environment"));
        }
        if self.results_per_query == 0 {
            return Err(Error::config("results_per_query must be at least 1"));
        }
        if self.search_concurrency == 0 {
            return Err(Error::config("search_concurrency must be at least 1"));
        }
        if self.generation_timeout_secs == 0 || self.search_timeout_secs == 0 {
            return Err(Error::config("timeouts must be non-zero"));
        }
        Ok(())
    }
}
