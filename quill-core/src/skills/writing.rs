//! Outlining, section formatting and final polish.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::llm::truncate_chars;

static INLINE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]+").expect("invalid regex"));

static MISSING_SENTENCE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z][.!?])([A-Z])").expect("invalid regex"));

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("invalid regex"));

/// A titled block of article body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

impl Section {
    pub fn new(heading: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            content: content.into(),
        }
    }
}

/// Section headings for an article on `topic`.
pub fn create_outline<S: AsRef<str>>(topic: &str, key_points: &[S]) -> Vec<String> {
    let mut outline = vec![format!("Introduction to {}", topic)];
    outline.extend(
        key_points
            .iter()
            .take(4)
            .map(|p| format!("Key Aspect: {}", truncate_chars(p.as_ref(), 50))),
    );
    outline.push("Implications and Future Outlook".to_string());
    outline.push("Conclusion".to_string());
    outline
}

pub fn format_section(heading: &str, content: &str) -> String {
    format!("\n## {}\n\n{}\n", heading, content)
}

/// Title plus an opening paragraph that leads into `context`.
pub fn create_introduction(topic: &str, context: &str) -> String {
    format!(
        "# {}\n\nIn today's rapidly evolving landscape, understanding {} \
         has become increasingly important. {}...",
        topic,
        topic.to_lowercase(),
        truncate_chars(context, 200)
    )
}

/// A numbered recap of the first three points.
pub fn create_conclusion<S: AsRef<str>>(main_points: &[S]) -> String {
    let mut conclusion =
        String::from("\n## Conclusion\n\nTo summarize, we've explored several key aspects:\n\n");
    for (i, point) in main_points.iter().take(3).enumerate() {
        conclusion.push_str(&format!(
            "{}. {}\n",
            i + 1,
            truncate_chars(point.as_ref(), 100)
        ));
    }
    conclusion.push_str("\nThese insights provide a comprehensive understanding of the topic.");
    conclusion
}

/// Assemble a Markdown article.
pub fn compile_article(
    title: &str,
    sections: &[Section],
    introduction: Option<&str>,
    conclusion: Option<&str>,
) -> String {
    let mut article = format!("# {}\n\n", title);

    if let Some(intro) = introduction.filter(|s| !s.is_empty()) {
        article.push_str(intro);
        article.push_str("\n\n");
    }

    for section in sections {
        article.push_str(&format_section(&section.heading, &section.content));
    }

    if let Some(conclusion) = conclusion.filter(|s| !s.is_empty()) {
        article.push_str(conclusion);
        article.push('\n');
    }

    article
}

/// Normalise spacing while keeping Markdown line structure intact.
pub fn polish(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| {
            let collapsed = INLINE_WHITESPACE.replace_all(line.trim(), " ");
            MISSING_SENTENCE_SPACE
                .replace_all(&collapsed, "$1 $2")
                .into_owned()
        })
        .collect();

    EXCESS_NEWLINES
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

/// Words separated by whitespace.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of `## ` section headings.
pub fn section_count(text: &str) -> usize {
    text.lines().filter(|l| l.starts_with("## ")).count()
}
