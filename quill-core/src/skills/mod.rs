//! Deterministic skills used by the pipeline stages.
//!
//! Planning, analysis, writing and editing are plain functions. The
//! checking capabilities (safety, bias, sanitization, claim verification)
//! are a closed set addressed through [`Capability`] and applied by a
//! [`Toolkit`].

mod analysis;
mod claims;
mod editing;
mod planning;
mod writing;

use serde::{Deserialize, Serialize};

pub use analysis::{extract_key_points, identify_themes, synthesize, THEME_VOCABULARY};
pub use claims::{
    extract_claims, fact_check_report, mean_confidence, verdict_counts, ClaimVerifier,
    FactCheckResult, Verdict, CLAIM_INDICATORS, MAX_CLAIMS, VERIFY_RESULTS,
};
pub use editing::{
    check_clarity, check_structure, editing_report, readability, suggestions, EditingSuggestion,
    IssueType, Readability, ReadabilityRating,
};
pub use planning::{
    create_research_plan, generate_search_queries, prioritize_tasks, query_count,
    workflow_summary, PrioritizedTask, ResearchPlan, TaskStatus, REQUIRED_STEPS,
};
pub use writing::{
    compile_article, create_conclusion, create_introduction, create_outline, format_section,
    polish, section_count, word_count, Section,
};

use crate::governance::{BiasClassifier, BiasDetection, SafetyAssessment, SafetyClassifier};

/// The fixed set of checking capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Safety,
    Bias,
    Sanitize,
    Verify,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Safety,
        Capability::Bias,
        Capability::Sanitize,
        Capability::Verify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safety => "safety",
            Self::Bias => "bias",
            Self::Sanitize => "sanitize",
            Self::Verify => "verify",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What applying a capability to a text produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "capability", content = "outcome", rename_all = "snake_case")]
pub enum CapabilityOutcome {
    Safety(SafetyAssessment),
    Bias(Vec<BiasDetection>),
    Sanitize(String),
    Verify(Vec<FactCheckResult>),
}

impl CapabilityOutcome {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Safety(_) => Capability::Safety,
            Self::Bias(_) => Capability::Bias,
            Self::Sanitize(_) => Capability::Sanitize,
            Self::Verify(_) => Capability::Verify,
        }
    }
}

/// One instance of every capability.
#[derive(Clone)]
pub struct Toolkit {
    pub safety: SafetyClassifier,
    pub bias: BiasClassifier,
    pub verifier: ClaimVerifier,
}

impl Toolkit {
    pub fn new(verifier: ClaimVerifier) -> Self {
        Self {
            safety: SafetyClassifier::new(),
            bias: BiasClassifier::new(),
            verifier,
        }
    }

    /// Apply `capability` to `text`. Only verification touches the network.
    /// `Sanitize` is PII redaction; caller inputs go through
    /// [`InputSanitizer`](crate::governance::InputSanitizer) instead.
    pub async fn apply(&self, capability: Capability, text: &str) -> CapabilityOutcome {
        match capability {
            Capability::Safety => CapabilityOutcome::Safety(self.safety.classify(text)),
            Capability::Bias => CapabilityOutcome::Bias(self.bias.classify(text)),
            Capability::Sanitize => CapabilityOutcome::Sanitize(self.safety.sanitize(text)),
            Capability::Verify => {
                let claims = self.verifier.extract(text);
                CapabilityOutcome::Verify(self.verifier.verify_all(&claims).await)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSearch;
    use std::sync::Arc;
    use std::time::Duration;

    fn toolkit() -> Toolkit {
        Toolkit::new(ClaimVerifier::new(
            Arc::new(StubSearch::with_snippets(&["solar power"])),
            Duration::from_secs(5),
        ))
    }

    #[tokio::test]
    async fn test_apply_each_capability() {
        let toolkit = toolkit();
        let text = "Solar power is growing fast around the world. Mail ann@example.com now.";

        for capability in Capability::ALL {
            let outcome = toolkit.apply(capability, text).await;
            assert_eq!(outcome.capability(), capability);
        }
    }

    #[tokio::test]
    async fn test_sanitize_and_verify_outcomes() {
        let toolkit = toolkit();
        let text = "Solar power is growing fast around the world. Mail ann@example.com now.";

        match toolkit.apply(Capability::Sanitize, text).await {
            CapabilityOutcome::Sanitize(out) => assert!(out.contains("[EMAIL]@example.com")),
            other => panic!("unexpected outcome: {:?}", other),
        }

        match toolkit.apply(Capability::Verify, text).await {
            CapabilityOutcome::Verify(results) => {
                assert_eq!(results.len(), 1);
                assert_eq!(results[0].verdict, Verdict::Verified);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_covers_every_extracted_claim_in_order() {
        let toolkit = toolkit();
        let text = "Solar power is growing fast around the world. \
            Wind farms have produced a record amount of energy this year. \
            Tidal power is still a niche research topic for now.";
        let extracted = extract_claims(text);
        assert!(extracted.len() > 1);

        match toolkit.apply(Capability::Verify, text).await {
            CapabilityOutcome::Verify(results) => {
                let claims: Vec<String> = results.into_iter().map(|r| r.claim).collect();
                assert_eq!(claims, extracted);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }
}
