//! Readability metrics, structural and clarity review.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

const PASSIVE_MARKERS: [&str; 4] = ["was", "were", "been", "being"];
const JARGON: [&str; 4] = ["utilize", "leverage", "synergy", "paradigm"];

/// Coarse readability rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadabilityRating {
    Good,
    NeedsImprovement,
}

impl std::fmt::Display for ReadabilityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "Good"),
            Self::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub total_words: usize,
    pub total_sentences: usize,
    pub avg_word_length: f64,
    pub avg_sentence_length: f64,
    pub rating: ReadabilityRating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueType {
    Structure,
    Clarity,
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Structure => write!(f, "Structure"),
            Self::Clarity => write!(f, "Clarity"),
        }
    }
}

/// A single editing recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingSuggestion {
    pub issue_type: IssueType,
    pub location: String,
    pub suggestion: String,
}

impl EditingSuggestion {
    fn new(issue_type: IssueType, location: &str, suggestion: impl Into<String>) -> Self {
        Self {
            issue_type,
            location: location.to_string(),
            suggestion: suggestion.into(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn readability(text: &str) -> Readability {
    let words: Vec<&str> = text.split_whitespace().collect();
    let sentences = text.split('.').filter(|s| !s.trim().is_empty()).count();

    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };
    let avg_sentence_length = if sentences == 0 {
        0.0
    } else {
        words.len() as f64 / sentences as f64
    };

    Readability {
        total_words: words.len(),
        total_sentences: sentences,
        avg_word_length: round2(avg_word_length),
        avg_sentence_length: round2(avg_sentence_length),
        rating: if avg_sentence_length < 20.0 {
            ReadabilityRating::Good
        } else {
            ReadabilityRating::NeedsImprovement
        },
    }
}

pub fn check_structure(text: &str) -> Vec<EditingSuggestion> {
    let mut suggestions = Vec::new();

    if !text.contains('#') {
        suggestions.push(EditingSuggestion::new(
            IssueType::Structure,
            "Document",
            "Consider adding section headings for better organization",
        ));
    }

    let first_line = text.split('\n').next().unwrap_or_default();
    if first_line.chars().count() < 50 {
        suggestions.push(EditingSuggestion::new(
            IssueType::Structure,
            "Introduction",
            "Consider adding a more comprehensive introduction",
        ));
    }

    let long_paragraphs = text
        .split("\n\n")
        .filter(|p| p.split_whitespace().count() > 150)
        .count();
    if long_paragraphs > 0 {
        suggestions.push(EditingSuggestion::new(
            IssueType::Structure,
            "Paragraphs",
            format!(
                "Found {} paragraphs that may be too long. Consider breaking them up.",
                long_paragraphs
            ),
        ));
    }

    suggestions
}

pub fn check_clarity(text: &str) -> Vec<EditingSuggestion> {
    let mut suggestions = Vec::new();
    let lower = text.to_lowercase();

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let passive = words.iter().filter(|w| PASSIVE_MARKERS.contains(w)).count();

    if passive as f64 > text.split_whitespace().count() as f64 * 0.05 {
        suggestions.push(EditingSuggestion::new(
            IssueType::Clarity,
            "Voice",
            "Consider using more active voice to improve clarity",
        ));
    }

    let jargon: Vec<&str> = JARGON
        .iter()
        .copied()
        .filter(|j| lower.contains(j))
        .collect();
    if !jargon.is_empty() {
        suggestions.push(EditingSuggestion::new(
            IssueType::Clarity,
            "Word Choice",
            format!("Consider simplifying terms: {}", jargon.join(", ")),
        ));
    }

    suggestions
}

/// Structural then clarity suggestions.
pub fn suggestions(text: &str) -> Vec<EditingSuggestion> {
    let mut all = check_structure(text);
    all.extend(check_clarity(text));
    all
}

/// Markdown review report for `text`.
pub fn editing_report(text: &str) -> String {
    let metrics = readability(text);
    let all = suggestions(text);

    let mut report = String::from("# Content Review Report\n\n## Readability Metrics\n");
    let _ = writeln!(report, "- **Total Words:** {}", metrics.total_words);
    let _ = writeln!(report, "- **Total Sentences:** {}", metrics.total_sentences);
    let _ = writeln!(report, "- **Avg Word Length:** {}", metrics.avg_word_length);
    let _ = writeln!(report, "- **Avg Sentence Length:** {}", metrics.avg_sentence_length);
    let _ = writeln!(report, "- **Readability Score:** {}", metrics.rating);

    report.push_str("\n## Suggestions for Improvement\n\n");
    if all.is_empty() {
        report.push_str("No major issues found. Content quality is good!\n");
    } else {
        for (i, s) in all.iter().enumerate() {
            let _ = writeln!(report, "{}. **{}** ({})", i + 1, s.issue_type, s.location);
            let _ = writeln!(report, "   {}\n", s.suggestion);
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readability_metrics() {
        let metrics = readability("The cat sat. The dog ran far.");
        assert_eq!(metrics.total_words, 7);
        assert_eq!(metrics.total_sentences, 2);
        assert_eq!(metrics.avg_sentence_length, 3.5);
        assert_eq!(metrics.rating, ReadabilityRating::Good);
    }

    #[test]
    fn test_readability_empty() {
        let metrics = readability("");
        assert_eq!(metrics.total_words, 0);
        assert_eq!(metrics.avg_word_length, 0.0);
        assert_eq!(metrics.rating, ReadabilityRating::Good);
    }

    #[test]
    fn test_long_sentences_need_improvement() {
        let text = format!("{}.", "word ".repeat(25));
        assert_eq!(readability(&text).rating, ReadabilityRating::NeedsImprovement);
    }

    #[test]
    fn test_structure_flags_missing_headings_and_short_intro() {
        let found = check_structure("Short intro.\n\nBody text.");
        let locations: Vec<_> = found.iter().map(|s| s.location.as_str()).collect();
        assert_eq!(locations, vec!["Document", "Introduction"]);
    }

    #[test]
    fn test_structure_flags_long_paragraphs() {
        let text = format!(
            "# A heading that is long enough to count as a real introduction line\n\n{}",
            "word ".repeat(160)
        );
        let found = check_structure(&text);
        assert_eq!(found.len(), 1);
        assert!(found[0].suggestion.starts_with("Found 1 paragraphs"));
    }

    #[test]
    fn test_clarity_passive_and_jargon() {
        let found = check_clarity("It was done. They were told. We leverage synergy.");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].location, "Voice");
        assert_eq!(
            found[1].suggestion,
            "Consider simplifying terms: leverage, synergy"
        );
    }

    #[test]
    fn test_report_without_issues() {
        let text = "# A sufficiently descriptive title for the whole article body\n\nShort and clear prose.";
        let report = editing_report(text);
        assert!(report.contains("- **Readability Score:** Good"));
        assert!(report.contains("No major issues found."));
    }
}
