//! # quill-core
//!
//! A six-stage research and writing pipeline with rule-based content
//! governance.
//!
//! ## Core Components
//!
//! - **Pipeline**: Coordinate, Search, Analyze, Write, FactCheck and Edit over a
//!   write-once [`PipelineState`]
//! - **LLM**: The text-generation collaborator and its providers
//! - **Search**: The web-search collaborator and bounded concurrent fan-out
//! - **Skills**: Deterministic planning, analysis, writing, editing and claim
//!   verification
//! - **Governance**: Input sanitization, safety and bias classifiers, the
//!   decision log and publication gates
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_core::{GovernanceCoordinator, Pipeline, QuillConfig, RunOutcome};
//!
//! let governance = GovernanceCoordinator::default();
//! let validation = governance.validate_input("Tidal energy", "medium");
//! if !validation.is_valid {
//!     return Err(validation.errors().join("; "));
//! }
//!
//! let pipeline = Pipeline::from_config(QuillConfig::from_env())?
//!     .with_decision_log(governance.decision_log());
//! let outcome = pipeline.run("Tidal energy", validation.depth_or_default()).await?;
//!
//! if let RunOutcome::Completed(state) = outcome {
//!     let article = state.final_article().unwrap_or_default();
//!     let safety = governance.check_content_safety(article);
//!     if governance.gate().evaluate(&safety.assessment).allowed {
//!         println!("{}", governance.finalize_content(&safety.sanitized_content, "Tidal energy"));
//!     }
//! }
//! ```

pub mod artifacts;
pub mod config;
pub mod error;
pub mod governance;
pub mod llm;
pub mod pipeline;
pub mod search;
pub mod skills;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use artifacts::write_artifacts;
pub use config::{AgentKind, Depth, PerDepth, QuillConfig, Temperatures};
pub use error::{Error, PipelineFailure, Result};
pub use governance::{
    Admission, AdvisoryGate, BiasClassifier, BiasDetection, DecisionLog, DecisionLogEntry, Gate,
    GateDecision, GovernanceConfig, GovernanceCoordinator, InputSanitizer, SafetyAssessment,
    SafetyClassifier, SafetyViolation, Severity, StrictGate, UsageTier, ValidationResult,
};
pub use llm::{
    CompletionRequest, CompletionResponse, LLMClient, OpenAICompatibleClient, PromptTemplate,
    Provider, TextGenerator,
};
pub use pipeline::{Pipeline, PipelineState, RunOutcome, Stage, StageResult};
pub use search::{SearchClient, SearchResult, SerperClient};
pub use skills::{Capability, CapabilityOutcome, ClaimVerifier, FactCheckResult, Toolkit, Verdict};
