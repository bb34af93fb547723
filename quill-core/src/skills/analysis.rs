//! Key-point extraction, theme matching and source synthesis.

use crate::llm::truncate_chars;

/// Vocabulary that theme identification matches against.
pub const THEME_VOCABULARY: [&str; 8] = [
    "technology",
    "business",
    "research",
    "development",
    "innovation",
    "market",
    "customer",
    "product",
];

const SYNTHESIS_LIMIT: usize = 2000;

/// The first `max_points` non-empty `.`-separated sentences.
pub fn extract_key_points(text: &str, max_points: usize) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(max_points)
        .map(str::to_string)
        .collect()
}

/// Vocabulary words present in `text`, in vocabulary order; `["general"]` if none.
pub fn identify_themes(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let themes: Vec<String> = THEME_VOCABULARY
        .iter()
        .filter(|kw| lower.contains(*kw))
        .map(|kw| kw.to_string())
        .collect();

    if themes.is_empty() {
        vec!["general".to_string()]
    } else {
        themes
    }
}

/// Join sources under a header, capped at 2000 characters of body.
pub fn synthesize<S: AsRef<str>>(sources: &[S]) -> String {
    if sources.is_empty() {
        return "No data to synthesize.".to_string();
    }

    let combined = sources
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Combined information from {} sources:\n\n{}",
        sources.len(),
        truncate_chars(&combined, SYNTHESIS_LIMIT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_key_points_skip_empty_sentences() {
        let points = extract_key_points("One. . Two.Three. Four. Five. Six.", 5);
        assert_eq!(points, vec!["One", "Two", "Three", "Four", "Five"]);
    }

    #[test]
    fn test_key_points_empty_text() {
        assert!(extract_key_points("", 5).is_empty());
        assert!(extract_key_points("...", 5).is_empty());
    }

    #[test]
    fn test_themes_match_vocabulary() {
        let themes = identify_themes("Market research drives Product Development.");
        assert_eq!(themes, vec!["research", "development", "market", "product"]);
    }

    #[test]
    fn test_themes_default_general() {
        assert_eq!(identify_themes("Birds sing at dawn."), vec!["general"]);
    }

    #[test]
    fn test_synthesize() {
        assert_eq!(synthesize::<&str>(&[]), "No data to synthesize.");

        let out = synthesize(&["a", "b"]);
        assert_eq!(out, "Combined information from 2 sources:\n\na\n\nb");

        let long = "x".repeat(5000);
        let out = synthesize(&[long.as_str()]);
        assert!(out.ends_with(&"x".repeat(2000)));
        assert!(!out.ends_with(&"x".repeat(2001)));
    }
}
