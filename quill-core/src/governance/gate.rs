//! Publication gates over governance results.
//!
//! Governance findings are advisory. A caller that wants unsafe content to
//! stop publication asks a [`Gate`] and acts on the decision itself; the
//! pipeline never consults one.

use serde::{Deserialize, Serialize};

use super::safety::SafetyAssessment;

/// Result of a gate decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateDecision {
    pub allowed: bool,
    pub reason: String,
}

impl GateDecision {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            reason: reason.into(),
        }
    }

    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
        }
    }
}

pub trait Gate: Send + Sync {
    fn name(&self) -> &'static str;

    fn evaluate(&self, assessment: &SafetyAssessment) -> GateDecision;
}

/// Never blocks; reports how many findings were seen.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryGate;

impl Gate for AdvisoryGate {
    fn name(&self) -> &'static str {
        "advisory"
    }

    fn evaluate(&self, assessment: &SafetyAssessment) -> GateDecision {
        if assessment.violations.is_empty() {
            GateDecision::allow("no safety findings")
        } else {
            GateDecision::allow(format!(
                "{} safety findings (advisory only)",
                assessment.violations.len()
            ))
        }
    }
}

/// Blocks whenever the content is not safe.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictGate;

impl Gate for StrictGate {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn evaluate(&self, assessment: &SafetyAssessment) -> GateDecision {
        if assessment.is_safe {
            return GateDecision::allow("content is safe");
        }
        let blocking: Vec<&str> = assessment
            .violations
            .iter()
            .filter(|v| v.severity.is_blocking())
            .map(|v| v.category.as_str())
            .collect();
        GateDecision::block(format!("blocking violations: {}", blocking.join(", ")))
    }
}
