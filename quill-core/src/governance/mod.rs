//! Rule-based governance around generated content.
//!
//! The classifiers are pure functions over text. [`GovernanceCoordinator`]
//! composes them into validation and reporting passes that run before and
//! after a pipeline run, independently of the pipeline's control flow.

mod bias;
mod decision_log;
mod gate;
mod safety;
mod sanitizer;

#[cfg(test)]
mod proptest;

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::{info, warn};

pub use bias::{BiasClassifier, BiasDetection, BiasType, RepresentationMetrics};
pub use decision_log::{
    explain_workflow, AuditLog, ConfidenceStats, ContentDigest, DecisionLog, DecisionLogEntry,
    LogMetadata,
};
pub use gate::{AdvisoryGate, Gate, GateDecision, StrictGate};
pub use safety::{
    disclaimer, SafetyAssessment, SafetyCategory, SafetyClassifier, SafetyViolation, Severity,
};
pub use sanitizer::{
    Admission, DepthValidation, InputSanitizer, UsageTier, ValidationResult, MAX_DEPTH_CHARS,
    MAX_REQUESTS_PER_HOUR, MAX_TOPIC_CHARS, PROHIBITED_TOPICS,
};

use crate::config::Depth;

/// Which guardrails are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceConfig {
    pub content_safety: bool,
    pub input_validation: bool,
    pub bias_detection: bool,
    pub transparency: bool,
    /// Selects [`StrictGate`] from [`GovernanceCoordinator::gate`]. Nothing
    /// else reads it.
    pub strict_mode: bool,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            content_safety: true,
            input_validation: true,
            bias_detection: true,
            transparency: true,
            strict_mode: false,
        }
    }
}

impl GovernanceConfig {
    pub fn disabled() -> Self {
        Self {
            content_safety: false,
            input_validation: false,
            bias_detection: false,
            transparency: false,
            strict_mode: false,
        }
    }

    pub fn strict() -> Self {
        Self {
            strict_mode: true,
            ..Self::default()
        }
    }

    fn flags(&self) -> [(&'static str, bool); 5] {
        [
            ("Content Safety Enabled", self.content_safety),
            ("Input Validation Enabled", self.input_validation),
            ("Bias Detection Enabled", self.bias_detection),
            ("Transparency Enabled", self.transparency),
            ("Strict Mode", self.strict_mode),
        ]
    }
}

/// Result of validating the caller's topic and depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputValidation {
    pub is_valid: bool,
    /// `None` when input validation is disabled.
    pub topic: Option<ValidationResult>,
    pub depth: Option<DepthValidation>,
}

impl InputValidation {
    /// Depth to run with: the validated value, or `medium`.
    pub fn depth_or_default(&self) -> Depth {
        self.depth.as_ref().map_or(Depth::default(), |d| d.depth)
    }

    /// Every topic and depth error.
    pub fn errors(&self) -> Vec<String> {
        self.topic
            .iter()
            .flat_map(|t| t.errors.iter())
            .chain(self.depth.iter().flat_map(|d| d.result.errors.iter()))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyCheck {
    pub assessment: SafetyAssessment,
    pub sanitized_content: String,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasCheck {
    pub detections: Vec<BiasDetection>,
    pub metrics: Option<RepresentationMetrics>,
    pub mitigated_content: String,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceMetrics {
    pub config: GovernanceConfig,
    pub confidence: ConfidenceStats,
    pub safety_enabled: bool,
    pub bias_detection_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernanceSummary {
    pub guardrails: Vec<(String, bool)>,
    pub features: Vec<String>,
}

/// Composes the guardrails and owns the decision log.
pub struct GovernanceCoordinator {
    config: GovernanceConfig,
    sanitizer: InputSanitizer,
    safety: SafetyClassifier,
    bias: BiasClassifier,
    log: Arc<DecisionLog>,
}

impl Default for GovernanceCoordinator {
    fn default() -> Self {
        Self::new(GovernanceConfig::default(), Arc::new(DecisionLog::default()))
    }
}

impl GovernanceCoordinator {
    pub fn new(config: GovernanceConfig, log: Arc<DecisionLog>) -> Self {
        Self {
            config,
            sanitizer: InputSanitizer::new(),
            safety: SafetyClassifier::new(),
            bias: BiasClassifier::new(),
            log,
        }
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Shared handle to the decision log, for the pipeline to append to.
    pub fn decision_log(&self) -> Arc<DecisionLog> {
        Arc::clone(&self.log)
    }

    /// Validate topic and depth before a run. The run should not start
    /// unless `is_valid` is true.
    pub fn validate_input(&self, topic: &str, depth: &str) -> InputValidation {
        if !self.config.input_validation {
            return InputValidation {
                is_valid: true,
                topic: None,
                depth: None,
            };
        }

        let topic_result = self.sanitizer.validate_topic(topic);
        let depth_result = self.sanitizer.validate_depth(depth);
        let is_valid = topic_result.is_valid && depth_result.result.is_valid;

        if !is_valid {
            warn!(
                topic_errors = topic_result.errors.len(),
                depth_valid = depth_result.result.is_valid,
                "input rejected"
            );
        }

        InputValidation {
            is_valid,
            topic: Some(topic_result),
            depth: Some(depth_result),
        }
    }

    pub fn check_content_safety(&self, content: &str) -> SafetyCheck {
        if !self.config.content_safety {
            return SafetyCheck {
                assessment: SafetyAssessment {
                    is_safe: true,
                    violations: Vec::new(),
                },
                sanitized_content: content.to_string(),
                report: String::new(),
            };
        }

        let assessment = self.safety.classify(content);
        info!(
            is_safe = assessment.is_safe,
            violations = assessment.violations.len(),
            "content safety checked"
        );
        SafetyCheck {
            sanitized_content: self.safety.sanitize(content),
            report: self.safety.report(&assessment.violations),
            assessment,
        }
    }

    pub fn detect_bias(&self, content: &str) -> BiasCheck {
        if !self.config.bias_detection {
            return BiasCheck {
                detections: Vec::new(),
                metrics: None,
                mitigated_content: content.to_string(),
                report: String::new(),
            };
        }

        let detections = self.bias.classify(content);
        let metrics = self.bias.representation(content);
        info!(
            detections = detections.len(),
            balance_score = metrics.balance_score,
            "bias checked"
        );
        BiasCheck {
            mitigated_content: self.bias.mitigate(content, &detections),
            report: self.bias.report(&detections, &metrics),
            detections,
            metrics: Some(metrics),
        }
    }

    pub fn log_decision(
        &self,
        agent_name: &str,
        input: &str,
        output: &str,
        reasoning: &str,
        confidence: f64,
    ) {
        if self.config.transparency {
            self.log.append(DecisionLogEntry::new(
                agent_name, input, output, reasoning, confidence,
            ));
        }
    }

    pub fn confidence_metrics(&self) -> ConfidenceStats {
        self.log.confidence_stats()
    }

    /// Append the disclaimer block when content safety is enabled.
    pub fn finalize_content(&self, content: &str, topic: &str) -> String {
        if self.config.content_safety {
            self.safety.add_disclaimer(content, topic)
        } else {
            content.to_string()
        }
    }

    /// The gate matching `strict_mode`. Callers decide whether to enforce it.
    pub fn gate(&self) -> Box<dyn Gate> {
        if self.config.strict_mode {
            Box::new(StrictGate)
        } else {
            Box::new(AdvisoryGate)
        }
    }

    pub fn comprehensive_report(&self) -> String {
        let mut report =
            String::from("# AI Governance & Responsible AI Report\n\n## System Configuration\n\n");
        for (label, enabled) in self.config.flags() {
            let status = if enabled { "Enabled" } else { "Disabled" };
            let _ = writeln!(report, "- **{}**: {}", label, status);
        }
        report.push_str("\n---\n\n");

        if self.config.transparency {
            report.push_str(&self.log.transparency_report());
            report.push_str("\n---\n\n");
            report.push_str(&self.log.source_attribution());
            report.push_str("\n---\n\n");
            report.push_str(explain_workflow());
        }

        report
    }

    pub fn metrics(&self) -> GovernanceMetrics {
        GovernanceMetrics {
            config: self.config,
            confidence: if self.config.transparency {
                self.log.confidence_stats()
            } else {
                ConfidenceStats::default()
            },
            safety_enabled: self.config.content_safety,
            bias_detection_enabled: self.config.bias_detection,
        }
    }

    pub fn summary(&self) -> GovernanceSummary {
        GovernanceSummary {
            guardrails: vec![
                ("Content Safety".to_string(), self.config.content_safety),
                ("Input Validation".to_string(), self.config.input_validation),
                ("Bias Detection".to_string(), self.config.bias_detection),
                ("Transparency".to_string(), self.config.transparency),
            ],
            features: [
                "Automated content safety checks",
                "Input sanitization and validation",
                "Bias detection and mitigation",
                "Full transparency and audit trails",
                "Source attribution",
                "AI-generated content disclaimers",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_topic_rejected() {
        let coordinator = GovernanceCoordinator::default();
        let validation = coordinator.validate_input("", "deep");
        assert!(!validation.is_valid);
        assert_eq!(validation.errors(), vec!["Topic cannot be empty"]);
    }

    #[test]
    fn test_invalid_depth_defaults_to_medium() {
        let validation = GovernanceCoordinator::default().validate_input("Tides", "extreme");
        assert!(!validation.is_valid);
        assert_eq!(validation.depth_or_default(), Depth::Medium);
    }

    #[test]
    fn test_disabled_guardrails_pass_through() {
        let coordinator =
            GovernanceCoordinator::new(GovernanceConfig::disabled(), Arc::new(DecisionLog::default()));
        assert!(coordinator.validate_input("", "nope").is_valid);

        let safety = coordinator.check_content_safety("call 555-123-4567 about the bomb");
        assert!(safety.assessment.is_safe);
        assert_eq!(safety.sanitized_content, "call 555-123-4567 about the bomb");

        assert!(coordinator.detect_bias("mankind").detections.is_empty());
        assert_eq!(coordinator.finalize_content("body", "t"), "body");

        coordinator.log_decision("a", "i", "o", "r", 0.9);
        assert!(coordinator.decision_log().is_empty());
    }

    #[test]
    fn test_safety_check_sanitizes_and_reports() {
        let check = GovernanceCoordinator::default()
            .check_content_safety("Email bob@example.com about the attack.");
        assert!(!check.assessment.is_safe);
        assert_eq!(
            check.sanitized_content,
            "Email [EMAIL]@example.com about the attack."
        );
        assert!(check.report.starts_with("# Content Safety Report"));
    }

    #[test]
    fn test_bias_check_mitigates() {
        let check = GovernanceCoordinator::default().detect_bias("Mankind adapts.");
        assert_eq!(check.detections.len(), 1);
        assert_eq!(check.mitigated_content, "humanity adapts.");
        assert!(check.metrics.is_some());
    }

    #[test]
    fn test_finalize_appends_disclaimer() {
        let out = GovernanceCoordinator::default().finalize_content("Body.", "Tides");
        assert!(out.starts_with("Body.\n---\n"));
        assert!(out.contains("AI-Generated Content Disclaimer"));
    }

    #[test]
    fn test_gate_follows_strict_mode() {
        let advisory = GovernanceCoordinator::default();
        assert_eq!(advisory.gate().name(), "advisory");

        let strict =
            GovernanceCoordinator::new(GovernanceConfig::strict(), Arc::new(DecisionLog::default()));
        let gate = strict.gate();
        assert_eq!(gate.name(), "strict");
        let check = strict.check_content_safety("weapon");
        assert!(!gate.evaluate(&check.assessment).allowed);
    }

    #[test]
    fn test_shared_log_and_metrics() {
        let log = Arc::new(DecisionLog::new("m"));
        let coordinator = GovernanceCoordinator::new(GovernanceConfig::default(), Arc::clone(&log));
        coordinator.log_decision("Editor", "in", "out", "polished", 0.6);
        log.append(DecisionLogEntry::new("Fact Checker", "in", "out", "checked", 0.8));

        let metrics = coordinator.metrics();
        assert_eq!(metrics.confidence.count, 2);
        assert!((coordinator.confidence_metrics().mean - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_comprehensive_report_sections() {
        let coordinator = GovernanceCoordinator::default();
        let report = coordinator.comprehensive_report();
        assert!(report.contains("- **Strict Mode**: Disabled"));
        assert!(report.contains("# AI System Transparency Report"));
        assert!(report.contains("# Source Attribution"));
        assert!(report.contains("# How This Content Was Created"));
    }

    #[test]
    fn test_summary_lists_guardrails() {
        let summary = GovernanceCoordinator::default().summary();
        assert_eq!(summary.guardrails.len(), 4);
        assert!(summary.guardrails.iter().all(|(_, enabled)| *enabled));
        assert_eq!(summary.features.len(), 6);
    }
}
