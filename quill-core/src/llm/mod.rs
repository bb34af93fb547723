//! Text-generation collaborator.
//!
//! Stages talk to the model through [`TextGenerator`], which renders a
//! [`PromptTemplate`] and sends it under an agent's system role. The
//! transport is any [`LLMClient`]; [`OpenAICompatibleClient`] covers Groq
//! and OpenAI.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_core::llm::{OpenAICompatibleClient, TextGenerator, PromptTemplate, TemplateVars};
//!
//! let client = OpenAICompatibleClient::groq(&config)?;
//! let generator = TextGenerator::new(Arc::new(client), config.generation_timeout());
//!
//! let mut vars = TemplateVars::new();
//! vars.insert("topic", "tidal energy".to_string());
//! let text = generator
//!     .invoke("You are a writer.", &PromptTemplate::new("Write about {topic}."), &vars, &settings)
//!     .await?;
//! ```

mod client;
mod generator;
mod template;
mod types;

pub use client::{ClientConfig, LLMClient, OpenAICompatibleClient};
pub(crate) use client::build_http_client;
pub use generator::{GenerationSettings, TextGenerator};
pub use template::{truncate_chars, PromptTemplate, TemplateVars};
pub use types::{
    ChatMessage, ChatRole, CompletionRequest, CompletionResponse, Provider, StopReason,
    TokenUsage,
};
