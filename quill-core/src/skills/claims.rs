//! Claim extraction and search-backed verification.
//!
//! Verification is a lexical-overlap heuristic: a claim counts as supported
//! by a snippet when the snippet contains any of the claim's first three
//! tokens. It says nothing about whether the snippet agrees with the claim.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::search::{SearchClient, SearchResult};

/// Words whose presence marks a sentence as a factual assertion.
pub const CLAIM_INDICATORS: [&str; 6] = ["is", "are", "has", "have", "will", "can"];

/// Maximum claims extracted from one text.
pub const MAX_CLAIMS: usize = 5;

/// Results fetched per claim.
pub const VERIFY_RESULTS: usize = 3;

/// Discretised confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    Verified,
    #[serde(rename = "Partially Verified")]
    PartiallyVerified,
    Disputed,
    Unverified,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Verified,
        Verdict::PartiallyVerified,
        Verdict::Disputed,
        Verdict::Unverified,
    ];

    /// Verdict for a confidence computed from at least one snippet.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.6 {
            Self::Verified
        } else if confidence >= 0.3 {
            Self::PartiallyVerified
        } else {
            Self::Disputed
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "Verified",
            Self::PartiallyVerified => "Partially Verified",
            Self::Disputed => "Disputed",
            Self::Unverified => "Unverified",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckResult {
    pub claim: String,
    pub verdict: Verdict,
    pub confidence: f64,
    pub supporting_sources: Vec<String>,
}

impl FactCheckResult {
    /// Score `claim` against already-fetched search results.
    pub fn from_results(claim: &str, results: &[SearchResult]) -> Self {
        if results.is_empty() {
            return Self {
                claim: claim.to_string(),
                verdict: Verdict::Unverified,
                confidence: 0.0,
                supporting_sources: Vec::new(),
            };
        }

        let lower = claim.to_lowercase();
        let lead: Vec<&str> = lower.split_whitespace().take(3).collect();
        let matching = results
            .iter()
            .filter(|r| {
                let snippet = r.snippet.to_lowercase();
                lead.iter().any(|token| snippet.contains(token))
            })
            .count();

        let confidence = matching as f64 / results.len() as f64;

        Self {
            claim: claim.to_string(),
            verdict: Verdict::from_confidence(confidence),
            confidence,
            supporting_sources: results.iter().map(|r| r.link.clone()).collect(),
        }
    }
}

/// Sentence-like units with more than five tokens and a claim indicator word.
/// At most five, earliest first.
pub fn extract_claims(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|unit| {
            let tokens: Vec<String> = unit
                .split_whitespace()
                .map(|t| {
                    t.trim_matches(|c: char| !c.is_alphanumeric())
                        .to_lowercase()
                })
                .collect();
            tokens.len() > 5 && tokens.iter().any(|t| CLAIM_INDICATORS.contains(&t.as_str()))
        })
        .take(MAX_CLAIMS)
        .map(str::to_string)
        .collect()
}

/// Verdict counts in a fixed order, including zero counts.
pub fn verdict_counts(results: &[FactCheckResult]) -> BTreeMap<Verdict, usize> {
    let mut counts: BTreeMap<Verdict, usize> = Verdict::ALL.iter().map(|v| (*v, 0)).collect();
    for result in results {
        *counts.entry(result.verdict).or_default() += 1;
    }
    counts
}

/// Mean confidence, 0 when there are no results.
pub fn mean_confidence(results: &[FactCheckResult]) -> f64 {
    if results.is_empty() {
        0.0
    } else {
        results.iter().map(|r| r.confidence).sum::<f64>() / results.len() as f64
    }
}

/// Markdown report of verification results.
pub fn fact_check_report(results: &[FactCheckResult]) -> String {
    if results.is_empty() {
        return "No verifiable claims found in the text.".to_string();
    }

    let mut report = String::from("# Fact Check Report\n\n");
    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(report, "## Claim {}", i + 1);
        let _ = writeln!(report, "**Statement:** {}\n", result.claim);
        let _ = writeln!(report, "**Verdict:** {}", result.verdict);
        let _ = writeln!(report, "**Confidence:** {:.2}%", result.confidence * 100.0);
        if !result.supporting_sources.is_empty() {
            report.push_str("**Sources:**\n");
            for source in &result.supporting_sources {
                let _ = writeln!(report, "- {}", source);
            }
        }
        report.push('\n');
    }
    report
}

/// Verifies claims against a search collaborator.
#[derive(Clone)]
pub struct ClaimVerifier {
    search: Arc<dyn SearchClient>,
    timeout: Duration,
}

impl ClaimVerifier {
    pub fn new(search: Arc<dyn SearchClient>, timeout: Duration) -> Self {
        Self { search, timeout }
    }

    pub fn extract(&self, text: &str) -> Vec<String> {
        extract_claims(text)
    }

    pub async fn verify(&self, claim: &str) -> FactCheckResult {
        let results =
            match tokio::time::timeout(self.timeout, self.search.search(claim, VERIFY_RESULTS))
                .await
            {
                Ok(results) => results,
                Err(_) => {
                    warn!(claim, "claim search timed out");
                    Vec::new()
                }
            };

        let result = FactCheckResult::from_results(claim, &results);
        debug!(verdict = %result.verdict, confidence = result.confidence, "claim verified");
        result
    }

    /// Verify each claim in order.
    pub async fn verify_all<S: AsRef<str>>(&self, claims: &[S]) -> Vec<FactCheckResult> {
        let mut results = Vec::with_capacity(claims.len());
        for claim in claims {
            results.push(self.verify(claim.as_ref()).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StubSearch;
    use pretty_assertions::assert_eq;

    fn result(snippet: &str) -> SearchResult {
        SearchResult::new("t", format!("https://{}.example", snippet.len()), snippet)
    }

    #[test]
    fn test_extract_requires_length_and_indicator() {
        let text = "Short one is here. Quantum computers can break RSA encryption schemes. \
                    This sentence lacks any marker words at all. The market has grown quickly this year!";
        let claims = extract_claims(text);
        assert_eq!(
            claims,
            vec![
                "Quantum computers can break RSA encryption schemes",
                "The market has grown quickly this year",
            ]
        );
    }

    #[test]
    fn test_extract_matches_whole_words_only() {
        // "this" contains "is" but is not the word "is".
        assert!(extract_claims("this thing sounds rather nice to me.").is_empty());
    }

    #[test]
    fn test_extract_caps_at_five() {
        let text = "The sky is blue over the sea. ".repeat(8);
        assert_eq!(extract_claims(&text).len(), MAX_CLAIMS);
    }

    #[test]
    fn test_no_results_is_unverified() {
        let r = FactCheckResult::from_results("The moon is made of rock", &[]);
        assert_eq!(r.verdict, Verdict::Unverified);
        assert_eq!(r.confidence, 0.0);
        assert!(r.supporting_sources.is_empty());
    }

    #[test]
    fn test_confidence_thresholds() {
        let claim = "Tides are caused by the moon";
        let all = [result("tides rise"), result("tides fall"), result("nothing")];
        let r = FactCheckResult::from_results(claim, &all);
        assert!((r.confidence - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(r.verdict, Verdict::Verified);

        let one = [result("tides"), result("x"), result("y")];
        assert_eq!(
            FactCheckResult::from_results(claim, &one).verdict,
            Verdict::PartiallyVerified
        );

        let none = [result("x"), result("y"), result("z")];
        let r = FactCheckResult::from_results(claim, &none);
        assert_eq!(r.verdict, Verdict::Disputed);
        assert_eq!(r.supporting_sources.len(), 3);
    }

    #[test]
    fn test_verdict_counts_include_zero() {
        let results = vec![FactCheckResult::from_results("a b c", &[])];
        let counts = verdict_counts(&results);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[&Verdict::Unverified], 1);
        assert_eq!(counts[&Verdict::Verified], 0);
    }

    #[test]
    fn test_report_rendering() {
        assert_eq!(
            fact_check_report(&[]),
            "No verifiable claims found in the text."
        );

        let r = FactCheckResult {
            claim: "Water is wet".to_string(),
            verdict: Verdict::PartiallyVerified,
            confidence: 1.0 / 3.0,
            supporting_sources: vec!["https://a.example".to_string()],
        };
        let report = fact_check_report(&[r]);
        assert!(report.contains("## Claim 1\n**Statement:** Water is wet\n"));
        assert!(report.contains("**Verdict:** Partially Verified\n"));
        assert!(report.contains("**Confidence:** 33.33%\n"));
        assert!(report.contains("- https://a.example\n"));
    }

    #[tokio::test]
    async fn test_verify_uses_search() {
        let stub = Arc::new(StubSearch::with_snippets(&["quantum rises", "other", "quantum"]));
        let verifier = ClaimVerifier::new(stub.clone(), Duration::from_secs(5));

        let r = verifier
            .verify("Quantum computers can factor large numbers")
            .await;
        assert_eq!(r.verdict, Verdict::Verified);
        assert_eq!(stub.calls(), 1);
        assert_eq!(stub.last_num_results(), Some(VERIFY_RESULTS));
    }

    #[tokio::test]
    async fn test_verify_all_degrades_on_empty_search() {
        let verifier = ClaimVerifier::new(Arc::new(StubSearch::empty()), Duration::from_secs(5));
        let results = verifier.verify_all(&["one claim", "two claim"]).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.verdict == Verdict::Unverified));
    }
}
