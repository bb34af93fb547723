//! Content-safety classification and PII redaction.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;

/// How serious a violation is. Only `High` and `Critical` make text unsafe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCategory {
    Violence,
    HateSpeech,
    SexualContent,
    PersonalInfo,
    MedicalAdvice,
    FinancialAdvice,
    LegalAdvice,
    UnverifiedClaims,
    Conspiracy,
}

impl SafetyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Violence => "violence",
            Self::HateSpeech => "hate_speech",
            Self::SexualContent => "sexual_content",
            Self::PersonalInfo => "personal_info",
            Self::MedicalAdvice => "medical_advice",
            Self::FinancialAdvice => "financial_advice",
            Self::LegalAdvice => "legal_advice",
            Self::UnverifiedClaims => "unverified_claims",
            Self::Conspiracy => "conspiracy",
        }
    }

    /// Prohibited categories are high severity, warning categories medium.
    pub fn severity(&self) -> Severity {
        match self {
            Self::UnverifiedClaims | Self::Conspiracy => Severity::Medium,
            _ => Severity::High,
        }
    }

    fn description(&self) -> String {
        let label = self.as_str().replace('_', " ");
        match self.severity() {
            Severity::Medium | Severity::Low => format!("Potential {}", label),
            Severity::High | Severity::Critical => format!("Detected {} content", label),
        }
    }
}

impl std::fmt::Display for SafetyCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyViolation {
    pub category: SafetyCategory,
    pub severity: Severity,
    pub description: String,
    pub flagged_span: String,
}

/// Outcome of classifying one text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAssessment {
    pub is_safe: bool,
    pub violations: Vec<SafetyViolation>,
}

const SSN: &str = r"\b\d{3}-\d{2}-\d{4}\b";
const CARD: &str = r"\b\d{16}\b";
const EMAIL: &str = r"\b[A-Za-z0-9._%+-]+@([A-Za-z0-9.-]+\.[A-Z|a-z]{2,})\b";
const PHONE: &str = r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b";

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("invalid regex")
}

/// Category patterns in reporting order: prohibited first, then warnings.
static PATTERNS: LazyLock<Vec<(SafetyCategory, Regex)>> = LazyLock::new(|| {
    use SafetyCategory::*;
    [
        (Violence, r"\b(kill|murder|assault|weapon|bomb|terrorist)\b"),
        (Violence, r"\b(violence|violent|attack|harm)\b"),
        (HateSpeech, r"\b(hate|discriminat(e|ion)|racist|sexist)\b"),
        (HateSpeech, r"\b(offensive|slur|derogatory)\b"),
        (SexualContent, r"\b(explicit|pornographic|sexual abuse)\b"),
        (SexualContent, r"\b(nsfw|adult content)\b"),
        (PersonalInfo, SSN),
        (PersonalInfo, CARD),
        (PersonalInfo, EMAIL),
        (MedicalAdvice, r"\b(diagnose|treatment|cure|medication)\s+(for|of)\b"),
        (MedicalAdvice, r"\b(take|use|consume)\s+\d+\s*(mg|ml|pills)\b"),
        (FinancialAdvice, r"\b(invest in|buy|sell)\s+(stock|crypto|bitcoin)\b"),
        (FinancialAdvice, r"\b(guaranteed|risk-free)\s+(profit|return)\b"),
        (LegalAdvice, r"\b(you should|must)\s+(sue|file|claim)\b"),
        (LegalAdvice, r"\b(legal advice|lawyer|attorney)\b"),
        (UnverifiedClaims, r"\b(definitely|certainly|absolutely)\s+(will|can|does)\b"),
        (UnverifiedClaims, r"\b(proven|scientific fact)\b"),
        (Conspiracy, r"\b(conspiracy|cover-up|secret agenda)\b"),
        (Conspiracy, r"\b(mainstream media|fake news)\b"),
    ]
    .into_iter()
    .map(|(category, pattern)| (category, ci(pattern)))
    .collect()
});

static SSN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(SSN).expect("invalid regex"));
static CARD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(CARD).expect("invalid regex"));
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| ci(EMAIL));
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(PHONE).expect("invalid regex"));

/// Pattern-table safety classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct SafetyClassifier;

impl SafetyClassifier {
    pub fn new() -> Self {
        Self
    }

    /// One violation per match of every pattern. Unsafe iff any violation blocks.
    pub fn classify(&self, text: &str) -> SafetyAssessment {
        let violations: Vec<SafetyViolation> = PATTERNS
            .iter()
            .flat_map(|(category, re)| {
                re.find_iter(text).map(move |m| SafetyViolation {
                    category: *category,
                    severity: category.severity(),
                    description: category.description(),
                    flagged_span: m.as_str().to_string(),
                })
            })
            .collect();

        let is_safe = !violations.iter().any(|v| v.severity.is_blocking());
        SafetyAssessment {
            is_safe,
            violations,
        }
    }

    /// Redact SSNs, card numbers, email local parts and phone numbers.
    ///
    /// Passes repeat until nothing changes, so the result is a fixed point.
    pub fn sanitize(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let next = redact_once(&current);
            if next == current {
                return current;
            }
            current = next;
        }
    }

    /// Markdown report grouped by severity, most severe first.
    pub fn report(&self, violations: &[SafetyViolation]) -> String {
        if violations.is_empty() {
            return "No safety violations detected.".to_string();
        }

        let mut report = String::from("# Content Safety Report\n\n");
        for severity in [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ] {
            let group: Vec<_> = violations.iter().filter(|v| v.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            let _ = write!(
                report,
                "\n## {} Severity Issues\n\n",
                severity.as_str().to_uppercase()
            );
            for v in group {
                let _ = writeln!(report, "- **{}**: {}", v.category, v.description);
                let _ = writeln!(report, "  - Flagged: `{}`", v.flagged_span);
            }
        }
        report
    }

    /// Append the disclaimer block stamped with the current time.
    pub fn add_disclaimer(&self, content: &str, topic: &str) -> String {
        format!("{}{}", content, disclaimer(topic, Utc::now()))
    }
}

fn redact_once(text: &str) -> String {
    let text = SSN_RE.replace_all(text, "[REDACTED-SSN]");
    let text = CARD_RE.replace_all(&text, "[REDACTED-CC]");
    let text = EMAIL_RE.replace_all(&text, "[EMAIL]@$1");
    PHONE_RE
        .replace_all(&text, "[REDACTED-PHONE]")
        .into_owned()
}

/// Disclaimer appended to finalized articles.
pub fn disclaimer(topic: &str, generated_at: DateTime<Utc>) -> String {
    format!(
        "\n---\n\n\
         ## AI-Generated Content Disclaimer\n\n\
         This article about \"{topic}\" was generated by a multi-agent AI system.\n\n\
         **Important Notes:**\n\
         - **Verify Information**: This content is for informational purposes only. Always verify facts from authoritative sources.\n\
         - **Not Professional Advice**: This is not medical, legal, financial, or professional advice. Consult qualified professionals for specific guidance.\n\
         - **Fact-Checking**: While automated fact-checking was performed, human verification is recommended.\n\
         - **Bias Awareness**: AI systems may reflect biases present in training data. Use critical thinking.\n\
         - **Time-Sensitive**: Information may become outdated. Check publication date and verify current relevance.\n\n\
         **Generated By**: Multi-Agent AI System\n\
         **Generation Date**: {date}\n\n\
         ---\n",
        topic = topic,
        date = generated_at.format("%Y-%m-%d %H:%M:%S"),
    )
}
