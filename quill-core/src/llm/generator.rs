//! The text-generation collaborator as seen by the pipeline stages.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::error::{Error, Result};

use super::client::LLMClient;
use super::template::{PromptTemplate, TemplateVars};
use super::types::{ChatMessage, CompletionRequest};

/// Sampling settings for a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

/// Role description plus templated instruction in, generated text out.
#[derive(Clone)]
pub struct TextGenerator {
    client: Arc<dyn LLMClient>,
    timeout: Duration,
}

impl TextGenerator {
    pub fn new(client: Arc<dyn LLMClient>, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Render `instruction` with `variables` and send it under `system_role`.
    ///
    /// Transport failures and timeouts are returned as errors; the caller
    /// decides whether they are fatal.
    pub async fn invoke(
        &self,
        system_role: &str,
        instruction: &PromptTemplate,
        variables: &TemplateVars,
        settings: &GenerationSettings,
    ) -> Result<String> {
        let prompt = instruction.render(variables);

        let mut request = CompletionRequest::new()
            .with_system(system_role)
            .with_message(ChatMessage::user(prompt))
            .with_temperature(settings.temperature)
            .with_max_tokens(settings.max_tokens);
        if let Some(model) = &settings.model {
            request = request.with_model(model);
        }

        let response = tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| Error::timeout(self.timeout.as_millis() as u64))??;

        debug!(
            provider = %self.client.provider(),
            model = %response.model,
            tokens = response.usage.total(),
            "generation complete"
        );

        Ok(response.content)
    }
}
