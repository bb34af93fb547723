//! Instruction templates with `{name}` placeholders.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_][a-z0-9_]*)\}").expect("invalid regex"));

/// Variables bound into a template.
pub type TemplateVars = BTreeMap<&'static str, String>;

/// A templated instruction sent to the text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: &'static str,
}

impl PromptTemplate {
    pub const fn new(source: &'static str) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Names of the placeholders in order of first appearance.
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        for cap in PLACEHOLDER.captures_iter(self.source) {
            if let Some(m) = cap.get(1) {
                if !names.contains(&m.as_str()) {
                    names.push(m.as_str());
                }
            }
        }
        names
    }

    /// Substitute every known placeholder. Unknown placeholders are left as-is
    /// so literal braces in instructions survive.
    pub fn render(&self, vars: &TemplateVars) -> String {
        PLACEHOLDER
            .replace_all(self.source, |caps: &regex::Captures<'_>| {
                let name = &caps[1];
                match vars.get(name) {
                    Some(value) => value.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
