//! Append-only audit log of agent decisions.
//!
//! One [`DecisionLog`] is created per coordinator and shared by reference
//! with every component that records decisions. Entries are never edited
//! or removed once appended.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::llm::truncate_chars;

const PREVIEW_CHARS: usize = 200;
const SOURCES_SHOWN: usize = 3;

/// SHA-256 of some content plus a short human-readable preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDigest {
    pub sha256: String,
    pub preview: String,
}

impl ContentDigest {
    pub fn of(content: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        Self {
            sha256: format!("{:x}", hasher.finalize()),
            preview: truncate_chars(content, PREVIEW_CHARS).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub agent_name: String,
    pub timestamp: DateTime<Utc>,
    pub input_digest: ContentDigest,
    pub output_digest: ContentDigest,
    pub reasoning: String,
    /// Clamped to [0, 1]; non-finite values become 0.
    pub confidence: f64,
    pub sources: Vec<String>,
}

impl DecisionLogEntry {
    pub fn new(
        agent_name: impl Into<String>,
        input: &str,
        output: &str,
        reasoning: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            timestamp: Utc::now(),
            input_digest: ContentDigest::of(input),
            output_digest: ContentDigest::of(output),
            reasoning: reasoning.into(),
            confidence: if confidence.is_finite() {
                confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            sources: Vec::new(),
        }
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }
}

/// Aggregate confidence over all logged decisions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMetadata {
    pub session_id: Uuid,
    pub model: String,
    pub started_at: DateTime<Utc>,
}

/// Machine-readable export of the whole log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub metadata: LogMetadata,
    pub decisions: Vec<DecisionLogEntry>,
    pub metrics: ConfidenceStats,
    pub exported_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct DecisionLog {
    metadata: LogMetadata,
    entries: RwLock<Vec<DecisionLogEntry>>,
}

impl Default for DecisionLog {
    fn default() -> Self {
        Self::new("unknown")
    }
}

impl DecisionLog {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            metadata: LogMetadata {
                session_id: Uuid::new_v4(),
                model: model.into(),
                started_at: Utc::now(),
            },
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn metadata(&self) -> &LogMetadata {
        &self.metadata
    }

    pub fn append(&self, entry: DecisionLogEntry) {
        debug!(
            agent = %entry.agent_name,
            confidence = entry.confidence,
            sources = entry.sources.len(),
            "decision logged"
        );
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry);
    }

    /// Snapshot of every entry in append order.
    pub fn entries(&self) -> Vec<DecisionLogEntry> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn confidence_stats(&self) -> ConfidenceStats {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        if entries.is_empty() {
            return ConfidenceStats::default();
        }

        let (sum, min, max) = entries.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), e| (sum + e.confidence, min.min(e.confidence), max.max(e.confidence)),
        );
        ConfidenceStats {
            mean: sum / entries.len() as f64,
            min,
            max,
            count: entries.len(),
        }
    }

    /// Every source across all entries, first occurrence order, no duplicates.
    pub fn unique_sources(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let mut seen = std::collections::HashSet::new();
        entries
            .iter()
            .flat_map(|e| e.sources.iter())
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect()
    }

    pub fn transparency_report(&self) -> String {
        let entries = self.entries();
        let mut report = String::from("# AI System Transparency Report\n\n## System Information\n\n");
        let _ = writeln!(report, "- **Session**: {}", self.metadata.session_id);
        let _ = writeln!(report, "- **Model**: {}", self.metadata.model);
        let _ = writeln!(report, "- **Session Start**: {}", self.metadata.started_at.to_rfc3339());
        let _ = writeln!(report, "- **Total Decisions**: {}\n", entries.len());

        report.push_str("## Agent Decision Trail\n\n");
        for (i, entry) in entries.iter().enumerate() {
            let _ = writeln!(report, "### {}. {}\n", i + 1, entry.agent_name);
            let _ = writeln!(report, "- **Time**: {}", entry.timestamp.to_rfc3339());
            let _ = writeln!(report, "- **Confidence**: {:.0}%", entry.confidence * 100.0);
            let _ = writeln!(report, "- **Reasoning**: {}", entry.reasoning);
            if !entry.sources.is_empty() {
                let _ = writeln!(report, "- **Sources Used**: {}", entry.sources.len());
                for source in entry.sources.iter().take(SOURCES_SHOWN) {
                    let _ = writeln!(report, "  - {}", source);
                }
            }
            report.push('\n');
        }
        report
    }

    pub fn source_attribution(&self) -> String {
        let sources = self.unique_sources();
        let mut report = String::from("# Source Attribution\n\n");

        if sources.is_empty() {
            report.push_str("No external sources used.\n");
            return report;
        }

        let _ = writeln!(
            report,
            "This content was generated using information from {} sources:\n",
            sources.len()
        );
        for (i, source) in sources.iter().enumerate() {
            let _ = writeln!(report, "{}. {}", i + 1, source);
        }
        report.push_str(
            "\n## Citation Note\n\n\
             All sources were accessed via web search and fact-checking processes. \
             Users should independently verify information from original sources.\n",
        );
        report
    }

    pub fn audit_log(&self) -> AuditLog {
        AuditLog {
            metadata: self.metadata.clone(),
            decisions: self.entries(),
            metrics: self.confidence_stats(),
            exported_at: Utc::now(),
        }
    }

    pub fn audit_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.audit_log())?)
    }
}

/// Plain-language description of how an article is produced.
pub fn explain_workflow() -> &'static str {
    "# How This Content Was Created

## Multi-Agent AI System

This content was generated by six specialized agents working in a fixed order:

### 1. Research Coordinator
- **Role**: Plans the research strategy
- **Process**: Analyzes the topic and creates search queries
- **Skill**: Strategic Planning

### 2. Web Searcher
- **Role**: Gathers information from the internet
- **Process**: Executes web searches for every planned query
- **Skill**: Information Retrieval

### 3. Data Analyst
- **Role**: Analyzes and synthesizes information
- **Process**: Extracts key insights and identifies themes
- **Skill**: Data Analysis

### 4. Content Writer
- **Role**: Creates the article
- **Process**: Structures information into coherent content
- **Skill**: Content Creation

### 5. Fact Checker
- **Role**: Verifies claims
- **Process**: Cross-references claims with additional searches
- **Skill**: Fact Verification

### 6. Editor
- **Role**: Improves quality
- **Process**: Reviews readability, structure and polish
- **Skill**: Quality Assurance

## Transparency Principles

- **Source Attribution**: All sources are documented
- **Decision Logging**: Every agent decision is recorded
- **Confidence Scores**: Each decision has a confidence level
- **Human Oversight**: Content should be reviewed by humans
- **Bias Detection**: Automated bias checking is performed

## Limitations

AI-generated content may contain inaccuracies or outdated information, reflect
biases in training data, lack nuance on complex topics, and needs human
fact-checking.

**Always verify important information from authoritative sources.**
"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn entry(agent: &str, confidence: f64, sources: &[&str]) -> DecisionLogEntry {
        DecisionLogEntry::new(agent, "in", "out", "because", confidence)
            .with_sources(sources.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_digest_is_stable() {
        let a = ContentDigest::of("hello");
        assert_eq!(
            a.sha256,
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
        assert_eq!(a.preview, "hello");
        assert_eq!(ContentDigest::of(&"z".repeat(500)).preview.len(), 200);
    }

    #[test]
    fn test_append_preserves_order() {
        let log = DecisionLog::new("test-model");
        log.append(entry("Research Coordinator", 0.9, &[]));
        log.append(entry("Web Searcher", 0.8, &[]));

        let names: Vec<_> = log.entries().into_iter().map(|e| e.agent_name).collect();
        assert_eq!(names, vec!["Research Coordinator", "Web Searcher"]);
    }

    #[test]
    fn test_confidence_clamped_and_stats() {
        let log = DecisionLog::default();
        assert_eq!(log.confidence_stats(), ConfidenceStats::default());

        log.append(entry("a", 1.5, &[]));
        log.append(entry("b", 0.5, &[]));
        log.append(entry("c", 0.0, &[]));

        let stats = log.confidence_stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.max, 1.0);
        assert_eq!(stats.min, 0.0);
        assert!((stats.mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_confidence_is_zero() {
        assert_eq!(entry("a", f64::NAN, &[]).confidence, 0.0);
        assert_eq!(entry("a", f64::INFINITY, &[]).confidence, 0.0);

        let log = DecisionLog::default();
        log.append(entry("a", f64::NAN, &[]));
        log.append(entry("b", 1.0, &[]));
        let stats = log.confidence_stats();
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 1.0);
        assert!((stats.mean - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unique_sources_and_attribution() {
        let log = DecisionLog::default();
        assert!(log.source_attribution().contains("No external sources used."));

        log.append(entry("a", 0.5, &["https://x", "https://y"]));
        log.append(entry("b", 0.5, &["https://y", "https://z"]));
        assert_eq!(log.unique_sources(), vec!["https://x", "https://y", "https://z"]);
        assert!(log.source_attribution().contains("3. https://z"));
    }

    #[test]
    fn test_transparency_report_shows_top_sources() {
        let log = DecisionLog::new("m");
        log.append(entry("Web Searcher", 0.8, &["s1", "s2", "s3", "s4"]));
        let report = log.transparency_report();
        assert!(report.contains("### 1. Web Searcher"));
        assert!(report.contains("- **Confidence**: 80%"));
        assert!(report.contains("- **Sources Used**: 4"));
        assert!(report.contains("  - s3\n"));
        assert!(!report.contains("  - s4\n"));
    }

    #[test]
    fn test_audit_json_round_trip() {
        let log = DecisionLog::new("m");
        log.append(entry("Editor", 0.7, &["src"]));
        let json = log.audit_json().unwrap();
        let parsed: AuditLog = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.decisions.len(), 1);
        assert_eq!(parsed.metadata.model, "m");
        assert_eq!(parsed.metrics.count, 1);
    }

    #[test]
    fn test_concurrent_appends() {
        let log = Arc::new(DecisionLog::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = Arc::clone(&log);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        log.append(entry(&format!("agent-{}", i), 0.5, &[]));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(log.len(), 200);
    }

    #[test]
    fn test_explain_workflow_names_every_agent() {
        let text = explain_workflow();
        for agent in ["Research Coordinator", "Web Searcher", "Data Analyst", "Content Writer", "Fact Checker", "Editor"] {
            assert!(text.contains(agent), "{}", agent);
        }
    }
}
