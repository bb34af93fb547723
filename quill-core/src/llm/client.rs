//! LLM client trait and the OpenAI-compatible provider.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::QuillConfig;
use crate::error::{Error, Result};

use super::types::{
    ChatRole, CompletionRequest, CompletionResponse, Provider, StopReason, TokenUsage,
};

/// LLM client trait for making completions.
#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Complete a prompt.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider for this client.
    fn provider(&self) -> Provider;
}

/// Configuration for LLM clients.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key
    pub api_key: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Default model
    pub default_model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            default_model: None,
            timeout_secs: 120,
        }
    }

    /// Derive a client configuration from the pipeline configuration.
    pub fn from_quill(config: &QuillConfig) -> Result<Self> {
        let api_key = config
            .llm_api_key
            .clone()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("GROQ_API_KEY not found in environment"))?;
        Ok(Self {
            api_key,
            base_url: config.llm_base_url.clone(),
            default_model: Some(config.model.clone()),
            timeout_secs: config.generation_timeout_secs,
        })
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Internal(format!("failed to create HTTP client: {}", e)))
}

/// Client for any provider speaking the OpenAI chat-completions protocol.
pub struct OpenAICompatibleClient {
    provider: Provider,
    config: ClientConfig,
    http: Client,
}

impl OpenAICompatibleClient {
    pub fn new(provider: Provider, config: ClientConfig) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            provider,
            config,
            http,
        })
    }

    /// Groq client built from the pipeline configuration.
    pub fn groq(config: &QuillConfig) -> Result<Self> {
        Self::new(Provider::Groq, ClientConfig::from_quill(config)?)
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(self.provider.default_base_url())
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    id: String,
    model: String,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

fn wire_messages(request: &CompletionRequest) -> Vec<WireMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if let Some(system) = &request.system {
        messages.push(WireMessage {
            role: ChatRole::System.as_str().to_string(),
            content: system.clone(),
        });
    }
    messages.extend(request.messages.iter().map(|m| WireMessage {
        role: m.role.as_str().to_string(),
        content: m.content.clone(),
    }));
    messages
}

fn parse_stop_reason(reason: &str) -> StopReason {
    match reason {
        "length" => StopReason::MaxTokens,
        "content_filter" => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    }
}

#[async_trait]
impl LLMClient for OpenAICompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let provider = self.provider.to_string();
        let model = request
            .model
            .clone()
            .or_else(|| self.config.default_model.clone())
            .ok_or_else(|| Error::config("no model configured"))?;

        let api_request = ChatCompletionRequest {
            model,
            messages: wire_messages(&request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| Error::llm_api(&provider, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::llm_api(&provider, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<WireError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(Error::llm_api(&provider, format!("({}) {}", status, message)));
        }

        let api_response: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::llm_api(&provider, format!("Failed to parse response: {}", e)))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::llm_api(&provider, "No choices in response"))?;

        let usage = api_response
            .usage
            .map(|u| TokenUsage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: api_response.id,
            model: api_response.model,
            content: choice.message.content,
            stop_reason: choice.finish_reason.as_deref().map(parse_stop_reason),
            usage,
            timestamp: Utc::now(),
        })
    }

    fn provider(&self) -> Provider {
        self.provider
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatMessage;

    #[test]
    fn test_system_prompt_goes_first() {
        let request = CompletionRequest::new()
            .with_system("You are an editor.")
            .with_message(ChatMessage::user("Fix this."));

        let messages = wire_messages(&request);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "Fix this.");
    }

    #[test]
    fn test_stop_reason_mapping() {
        assert_eq!(parse_stop_reason("stop"), StopReason::EndTurn);
        assert_eq!(parse_stop_reason("length"), StopReason::MaxTokens);
        assert_eq!(parse_stop_reason("content_filter"), StopReason::ContentFilter);
    }

    #[test]
    fn test_client_config_from_quill() {
        let quill = QuillConfig::default();
        assert!(ClientConfig::from_quill(&quill).is_err());

        let quill = QuillConfig::default().with_llm_api_key("k").with_model("m");
        let config = ClientConfig::from_quill(&quill).unwrap();
        assert_eq!(config.api_key, "k");
        assert_eq!(config.default_model.as_deref(), Some("m"));
    }

    #[test]
    fn test_base_url_override() {
        let client = OpenAICompatibleClient::new(
            Provider::Groq,
            ClientConfig::new("k").with_base_url("http://localhost:9999"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "http://localhost:9999");
        assert_eq!(client.provider(), Provider::Groq);
    }
}
