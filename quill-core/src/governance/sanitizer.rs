//! Validation and cleaning of caller-supplied inputs.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::LazyLock;
use tracing::warn;

use crate::config::Depth;
use crate::llm::truncate_chars;

pub const MAX_TOPIC_CHARS: usize = 500;
pub const MAX_DEPTH_CHARS: usize = 20;
const MAX_SANITIZED_CHARS: usize = 1000;
const SPECIAL_CHAR_WARN_RATIO: f64 = 0.3;

/// Requests one caller may make per hour.
pub const MAX_REQUESTS_PER_HOUR: usize = 10;

/// Injection-style tokens rejected in any input, as (label, pattern).
const INJECTION_PATTERNS: [(&str, &str); 9] = [
    ("<script", r"<script"),
    ("javascript:", r"javascript:"),
    (r"on\w+\s*=", r"on\w+\s*="),
    ("eval(", r"eval\("),
    ("exec(", r"exec\("),
    ("system(", r"system\("),
    ("__import__", r"__import__"),
    ("${", r"\$\{"),
    ("<!--", r"<!--"),
];

/// Subjects the system refuses to research.
pub const PROHIBITED_TOPICS: [&str; 9] = [
    "how to make explosives",
    "how to hack",
    "illegal drugs",
    "child exploitation",
    "bioweapons",
    "weapons of mass destruction",
    "terrorism",
    "suicide methods",
    "self-harm techniques",
];

static INJECTION: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    INJECTION_PATTERNS
        .iter()
        .map(|(label, p)| (*label, Regex::new(&format!("(?i){}", p)).expect("invalid regex")))
        .collect()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("invalid regex"));
static SQL_TOKENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[';]|--|/\*|\*/|\*").expect("invalid regex"));

/// Outcome of validating one input field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub sanitized_text: String,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validated depth plus the raw field result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthValidation {
    pub depth: Depth,
    pub result: ValidationResult,
}

/// Subscription tier, each with a per-request cost ceiling in USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageTier {
    #[default]
    Free,
    Basic,
    Pro,
    Enterprise,
}

impl UsageTier {
    /// Unknown names get the free tier.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "basic" => Self::Basic,
            "pro" => Self::Pro,
            "enterprise" => Self::Enterprise,
            _ => Self::Free,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Basic => "basic",
            Self::Pro => "pro",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn cost_limit(&self) -> f64 {
        match self {
            Self::Free => 0.50,
            Self::Basic => 2.00,
            Self::Pro => 10.00,
            Self::Enterprise => 100.00,
        }
    }
}

/// Whether a request may proceed, with the message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "message", rename_all = "snake_case")]
pub enum Admission {
    Allowed(String),
    Denied(String),
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Allowed(message) | Self::Denied(message) => message,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputSanitizer;

impl InputSanitizer {
    pub fn new() -> Self {
        Self
    }

    pub fn validate_topic(&self, topic: &str) -> ValidationResult {
        if topic.trim().is_empty() {
            return ValidationResult {
                is_valid: false,
                sanitized_text: String::new(),
                errors: vec!["Topic cannot be empty".to_string()],
                warnings: Vec::new(),
            };
        }

        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if topic.chars().count() > MAX_TOPIC_CHARS {
            errors.push(format!("Topic too long (max {} characters)", MAX_TOPIC_CHARS));
        }

        for (label, pattern) in INJECTION.iter() {
            if pattern.is_match(topic) {
                errors.push(format!("Prohibited pattern detected: {}", label));
            }
        }

        let lower = topic.to_lowercase();
        for prohibited in PROHIBITED_TOPICS {
            if lower.contains(prohibited) {
                errors.push(format!(
                    "Prohibited topic: Cannot generate content about {}",
                    prohibited
                ));
            }
        }

        let sanitized = self.sanitize_text(topic);

        let total = sanitized.chars().count();
        if total > 0 {
            let special = sanitized
                .chars()
                .filter(|c| !c.is_ascii_alphanumeric() && !c.is_whitespace())
                .count();
            if special as f64 / total as f64 > SPECIAL_CHAR_WARN_RATIO {
                warnings.push("Topic contains many special characters".to_string());
            }
        }

        ValidationResult {
            is_valid: errors.is_empty(),
            sanitized_text: sanitized,
            errors,
            warnings,
        }
    }

    /// Unknown depths are reported and replaced by `medium`.
    pub fn validate_depth(&self, depth: &str) -> DepthValidation {
        let candidate = truncate_chars(depth, MAX_DEPTH_CHARS + 1);
        match candidate.parse::<Depth>() {
            Ok(parsed) if depth.chars().count() <= MAX_DEPTH_CHARS => DepthValidation {
                depth: parsed,
                result: ValidationResult {
                    is_valid: true,
                    sanitized_text: parsed.as_str().to_string(),
                    errors: Vec::new(),
                    warnings: Vec::new(),
                },
            },
            _ => DepthValidation {
                depth: Depth::Medium,
                result: ValidationResult {
                    is_valid: false,
                    sanitized_text: Depth::Medium.as_str().to_string(),
                    errors: vec![
                        "Invalid depth. Must be one of: shallow, medium, deep".to_string()
                    ],
                    warnings: Vec::new(),
                },
            },
        }
    }

    /// Strip null bytes, control characters, tags and SQL comment tokens;
    /// collapse whitespace; cap the length.
    pub fn sanitize_text(&self, text: &str) -> String {
        let cleaned: String = text
            .chars()
            .filter(|c| *c != '\0' && (!c.is_control() || *c == '\n' || *c == '\t'))
            .collect();
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let untagged = TAG.replace_all(&collapsed, "");
        let stripped = SQL_TOKENS.replace_all(&untagged, "");
        truncate_chars(&stripped, MAX_SANITIZED_CHARS).trim().to_string()
    }

    /// `requests` is the caller's count over the last hour. Counting is
    /// left to the caller.
    pub fn check_rate_limit(&self, user_id: &str, requests: usize) -> Admission {
        if requests > MAX_REQUESTS_PER_HOUR {
            warn!(user_id, requests, "rate limit exceeded");
            return Admission::Denied(format!(
                "Rate limit exceeded. Max {} requests per hour.",
                MAX_REQUESTS_PER_HOUR
            ));
        }
        Admission::Allowed("Request allowed".to_string())
    }

    /// Compare an estimated request cost in USD against the tier's ceiling.
    pub fn validate_api_usage(&self, estimated_cost: f64, tier: UsageTier) -> Admission {
        if !estimated_cost.is_finite() || estimated_cost < 0.0 {
            return Admission::Denied("Invalid cost estimate".to_string());
        }
        let limit = tier.cost_limit();
        if estimated_cost > limit {
            warn!(tier = tier.as_str(), estimated_cost, "tier cost limit exceeded");
            return Admission::Denied(format!("Request exceeds tier limit of ${:.2}", limit));
        }
        Admission::Allowed(format!("Estimated cost: ${:.2}", estimated_cost))
    }

    pub fn report(&self, result: &ValidationResult) -> String {
        let mut report = String::from("# Input Validation Report\n\n");
        report.push_str(if result.is_valid {
            "**Status**: Valid\n\n"
        } else {
            "**Status**: Invalid\n\n"
        });

        if !result.errors.is_empty() {
            report.push_str("## Errors\n\n");
            for error in &result.errors {
                let _ = writeln!(report, "- {}", error);
            }
            report.push('\n');
        }

        if !result.warnings.is_empty() {
            report.push_str("## Warnings\n\n");
            for warning in &result.warnings {
                let _ = writeln!(report, "- {}", warning);
            }
            report.push('\n');
        }

        if !result.sanitized_text.is_empty() {
            let _ = writeln!(
                report,
                "## Sanitized Input\n\n```\n{}\n```",
                result.sanitized_text
            );
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_topic() {
        for topic in ["", "   ", "\n\t"] {
            let result = InputSanitizer::new().validate_topic(topic);
            assert!(!result.is_valid);
            assert_eq!(result.errors, vec!["Topic cannot be empty"]);
            assert!(result.sanitized_text.is_empty());
        }
    }

    #[test]
    fn test_valid_topic() {
        let result = InputSanitizer::new()
            .validate_topic("  Quantum Computing   Applications in Cryptography ");
        assert!(result.is_valid);
        assert_eq!(
            result.sanitized_text,
            "Quantum Computing Applications in Cryptography"
        );
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_injection_rejected() {
        let result = InputSanitizer::new().validate_topic("<script>alert(1)</script> tides");
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Prohibited pattern detected: <script"]);
        assert_eq!(result.sanitized_text, "alert(1) tides");
    }

    #[test]
    fn test_template_and_handler_injection() {
        let sanitizer = InputSanitizer::new();
        assert!(!sanitizer.validate_topic("${jndi:ldap}").is_valid);
        assert!(!sanitizer.validate_topic("img onerror = x").is_valid);
    }

    #[test]
    fn test_prohibited_topic() {
        let result = InputSanitizer::new().validate_topic("History of Terrorism in Europe");
        assert!(!result.is_valid);
        assert_eq!(
            result.errors,
            vec!["Prohibited topic: Cannot generate content about terrorism"]
        );
    }

    #[test]
    fn test_topic_too_long() {
        let result = InputSanitizer::new().validate_topic(&"a".repeat(501));
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["Topic too long (max 500 characters)"]);
    }

    #[test]
    fn test_special_character_warning() {
        let result = InputSanitizer::new().validate_topic("C++ & C# !!! ???");
        assert!(result.is_valid);
        assert_eq!(result.warnings, vec!["Topic contains many special characters"]);
    }

    #[test]
    fn test_sanitize_text_strips_sql_and_controls() {
        let out = InputSanitizer::new().sanitize_text("a\0b\x07c 'x'; -- /* y */");
        assert_eq!(out, "abc x   y");
    }

    #[test]
    fn test_validate_depth() {
        let sanitizer = InputSanitizer::new();
        let ok = sanitizer.validate_depth("deep");
        assert_eq!(ok.depth, Depth::Deep);
        assert!(ok.result.is_valid);

        let bad = sanitizer.validate_depth("extreme");
        assert_eq!(bad.depth, Depth::Medium);
        assert!(!bad.result.is_valid);
        assert_eq!(bad.result.sanitized_text, "medium");
    }

    #[test]
    fn test_rate_limit() {
        let sanitizer = InputSanitizer::new();
        assert_eq!(
            sanitizer.check_rate_limit("user-1", MAX_REQUESTS_PER_HOUR),
            Admission::Allowed("Request allowed".to_string())
        );

        let denied = sanitizer.check_rate_limit("user-1", MAX_REQUESTS_PER_HOUR + 1);
        assert!(!denied.is_allowed());
        assert_eq!(
            denied.message(),
            "Rate limit exceeded. Max 10 requests per hour."
        );
    }

    #[test]
    fn test_api_usage_tier_limits() {
        let sanitizer = InputSanitizer::new();

        let ok = sanitizer.validate_api_usage(0.5, UsageTier::Free);
        assert!(ok.is_allowed());
        assert_eq!(ok.message(), "Estimated cost: $0.50");

        let over = sanitizer.validate_api_usage(0.51, UsageTier::Free);
        assert_eq!(
            over,
            Admission::Denied("Request exceeds tier limit of $0.50".to_string())
        );

        assert!(sanitizer.validate_api_usage(1.5, UsageTier::Basic).is_allowed());
        assert!(!sanitizer.validate_api_usage(10.01, UsageTier::Pro).is_allowed());
        assert!(sanitizer.validate_api_usage(99.0, UsageTier::Enterprise).is_allowed());
        assert!(!sanitizer.validate_api_usage(f64::NAN, UsageTier::Enterprise).is_allowed());
    }

    #[test]
    fn test_unknown_tier_is_free() {
        assert_eq!(UsageTier::from_name("Pro"), UsageTier::Pro);
        assert_eq!(UsageTier::from_name("platinum"), UsageTier::Free);
        assert_eq!(UsageTier::from_name("platinum").cost_limit(), 0.50);
    }

    #[test]
    fn test_report() {
        let sanitizer = InputSanitizer::new();
        let report = sanitizer.report(&sanitizer.validate_topic(""));
        assert!(report.contains("**Status**: Invalid"));
        assert!(report.contains("- Topic cannot be empty"));
        assert!(!report.contains("Sanitized Input"));
    }
}
