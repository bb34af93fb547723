//! Bias detection, pronoun representation and term substitution.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::LazyLock;

const DEFAULT_SUGGESTION: &str = "Consider using more inclusive language";
const STEREOTYPE_SUGGESTION: &str = "Avoid generalizations about groups of people";
const TERM_CONFIDENCE: f64 = 0.8;
const STEREOTYPE_CONFIDENCE: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiasType {
    Gender,
    Age,
    Disability,
    Socioeconomic,
    Stereotype,
}

impl BiasType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gender => "gender",
            Self::Age => "age",
            Self::Disability => "disability",
            Self::Socioeconomic => "socioeconomic",
            Self::Stereotype => "stereotype",
        }
    }

    /// Capitalised label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gender => "Gender",
            Self::Age => "Age",
            Self::Disability => "Disability",
            Self::Socioeconomic => "Socioeconomic",
            Self::Stereotype => "Stereotype",
        }
    }
}

impl std::fmt::Display for BiasType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasDetection {
    pub bias_type: BiasType,
    pub confidence: f64,
    pub description: String,
    pub flagged_span: String,
    pub suggestion: String,
}

/// Pronoun counts and the derived balance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentationMetrics {
    pub male_pronouns: usize,
    pub female_pronouns: usize,
    pub neutral_pronouns: usize,
    pub person_first_language: usize,
    /// In [0, 1]; 0 when no pronouns are present.
    pub balance_score: f64,
}

impl RepresentationMetrics {
    pub fn total_pronouns(&self) -> usize {
        self.male_pronouns + self.female_pronouns + self.neutral_pronouns
    }
}

struct TermFamily {
    bias_type: BiasType,
    patterns: Vec<Regex>,
    alternatives: &'static [(&'static str, &'static str)],
}

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){}", pattern)).expect("invalid regex")
}

// A male pronoun only counts as biased when no female or neutral pronoun
// follows it on the same line; see `male_only_pronouns`.
static MALE_PRONOUN: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(he|him|his)\b"));
static BALANCING_PRONOUN: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(she|her|they)\b"));

static FEMALE_PRONOUN: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(she|her|hers)\b"));
static NEUTRAL_PRONOUN: LazyLock<Regex> = LazyLock::new(|| ci(r"\b(they|them|their)\b"));
static PERSON_FIRST: LazyLock<Regex> = LazyLock::new(|| ci(r"\bperson with\b"));

static FAMILIES: LazyLock<Vec<TermFamily>> = LazyLock::new(|| {
    vec![
        TermFamily {
            bias_type: BiasType::Gender,
            patterns: [
                r"\bmankind\b",
                r"\bmanpower\b",
                r"\bfreshman\b",
                r"\bchairman\b",
                r"\bsalesman\b",
            ]
            .into_iter()
            .map(ci)
            .collect(),
            alternatives: &[
                ("mankind", "humanity"),
                ("manpower", "workforce"),
                ("freshman", "first-year student"),
                ("chairman", "chairperson"),
                ("salesman", "salesperson"),
            ],
        },
        TermFamily {
            bias_type: BiasType::Age,
            patterns: [
                r"\b(elderly|old people|aged)\b",
                r"\byoung people are\b",
                r"\bmillennials are\b",
            ]
            .into_iter()
            .map(ci)
            .collect(),
            alternatives: &[
                ("elderly", "older adults"),
                ("old people", "older adults"),
                ("aged", "older"),
            ],
        },
        TermFamily {
            bias_type: BiasType::Disability,
            patterns: [
                r"\b(handicapped|crippled|suffering from)\b",
                r"\bwheelchair-bound\b",
                r"\bafflicted with\b",
            ]
            .into_iter()
            .map(ci)
            .collect(),
            alternatives: &[
                ("handicapped", "person with a disability"),
                ("wheelchair-bound", "wheelchair user"),
                ("suffering from", "living with"),
            ],
        },
        TermFamily {
            bias_type: BiasType::Socioeconomic,
            patterns: [
                r"\b(poor people are|rich people are)\b",
                r"\blow-income\s+\w+\s+are\b",
            ]
            .into_iter()
            .map(ci)
            .collect(),
            alternatives: &[],
        },
    ]
});

static STEREOTYPES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"\bwomen are\s+(emotional|nurturing|weak)\b",
        r"\bmen are\s+(aggressive|strong|logical)\b",
        r"\basians are\s+(good at|smart)\b",
        r"\bmuslims are\s+",
        r"\b(all|most)\s+\w+\s+people\s+are\b",
    ]
    .into_iter()
    .map(ci)
    .collect()
});

const EXTRA_SUGGESTIONS: [(&str, &str); 8] = [
    ("guys", "everyone / folks / team"),
    ("manmade", "artificial / synthetic"),
    ("blacklist", "blocklist"),
    ("whitelist", "allowlist"),
    ("master/slave", "primary/replica"),
    ("crazy", "surprising / unexpected"),
    ("insane", "remarkable / extraordinary"),
    ("lame", "disappointing / inadequate"),
];

fn term_detection(bias_type: BiasType, flagged: &str, suggestion: &str) -> BiasDetection {
    BiasDetection {
        bias_type,
        confidence: TERM_CONFIDENCE,
        description: format!("{} bias detected", bias_type.label()),
        flagged_span: flagged.to_string(),
        suggestion: suggestion.to_string(),
    }
}

/// Male pronouns with no female or neutral pronoun later on the same line.
fn male_only_pronouns(text: &str) -> impl Iterator<Item = &str> {
    MALE_PRONOUN.find_iter(text).filter_map(move |m| {
        let rest = &text[m.end()..];
        let line_rest = rest.split('\n').next().unwrap_or_default();
        (!BALANCING_PRONOUN.is_match(line_rest)).then_some(m.as_str())
    })
}

/// Pattern-table bias classifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct BiasClassifier;

impl BiasClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Biased terms family by family, then stereotypes.
    pub fn classify(&self, text: &str) -> Vec<BiasDetection> {
        let mut detections: Vec<BiasDetection> = male_only_pronouns(text)
            .map(|flagged| term_detection(BiasType::Gender, flagged, DEFAULT_SUGGESTION))
            .collect();

        for family in FAMILIES.iter() {
            for pattern in &family.patterns {
                for m in pattern.find_iter(text) {
                    let flagged = m.as_str();
                    let lower = flagged.to_lowercase();
                    let suggestion = family
                        .alternatives
                        .iter()
                        .find(|(term, _)| *term == lower)
                        .map_or(DEFAULT_SUGGESTION, |(_, alt)| *alt);
                    detections.push(term_detection(family.bias_type, flagged, suggestion));
                }
            }
        }

        for pattern in STEREOTYPES.iter() {
            for m in pattern.find_iter(text) {
                detections.push(BiasDetection {
                    bias_type: BiasType::Stereotype,
                    confidence: STEREOTYPE_CONFIDENCE,
                    description: "Stereotypical statement detected".to_string(),
                    flagged_span: m.as_str().to_string(),
                    suggestion: STEREOTYPE_SUGGESTION.to_string(),
                });
            }
        }

        detections
    }

    /// Pronoun counts with `balance_score = neutral*0.7 + (1 - |m - f| / total)*0.3`.
    pub fn representation(&self, text: &str) -> RepresentationMetrics {
        let male = MALE_PRONOUN.find_iter(text).count();
        let female = FEMALE_PRONOUN.find_iter(text).count();
        let neutral = NEUTRAL_PRONOUN.find_iter(text).count();
        let total = male + female + neutral;

        let balance_score = if total == 0 {
            0.0
        } else {
            let neutral_ratio = neutral as f64 / total as f64;
            let gender_diff = male.abs_diff(female) as f64 / total as f64;
            neutral_ratio * 0.7 + (1.0 - gender_diff) * 0.3
        };

        RepresentationMetrics {
            male_pronouns: male,
            female_pronouns: female,
            neutral_pronouns: neutral,
            person_first_language: PERSON_FIRST.find_iter(text).count(),
            balance_score,
        }
    }

    /// Substitute single-token suggestions; multi-word ones are left to the author.
    pub fn mitigate(&self, text: &str, detections: &[BiasDetection]) -> String {
        let mut mitigated = text.to_string();
        for detection in detections {
            if detection.suggestion.is_empty() || detection.suggestion.contains(' ') {
                continue;
            }
            let pattern = ci(&format!(r"\b{}\b", regex::escape(&detection.flagged_span)));
            mitigated = pattern
                .replace_all(&mitigated, NoExpand(&detection.suggestion))
                .into_owned();
        }
        mitigated
    }

    /// Markdown report grouped by bias type, with representation analysis.
    pub fn report(&self, detections: &[BiasDetection], metrics: &RepresentationMetrics) -> String {
        let mut report = String::from("# Bias Detection Report\n\n");

        if detections.is_empty() {
            report.push_str("No significant bias detected.\n\n");
        } else {
            let _ = writeln!(
                report,
                "Found {} potential bias issues.\n",
                detections.len()
            );

            let mut by_type: BTreeMap<BiasType, Vec<&BiasDetection>> = BTreeMap::new();
            for d in detections {
                by_type.entry(d.bias_type).or_default().push(d);
            }
            for (bias_type, items) in by_type {
                let _ = writeln!(report, "## {} Bias\n", bias_type.label());
                for item in items {
                    let _ = writeln!(report, "- **Flagged**: `{}`", item.flagged_span);
                    let _ = writeln!(report, "  - **Suggestion**: {}", item.suggestion);
                    let _ = writeln!(
                        report,
                        "  - **Confidence**: {:.0}%\n",
                        item.confidence * 100.0
                    );
                }
            }
        }

        report.push_str("## Representation Analysis\n\n");
        let _ = writeln!(report, "- Male pronouns: {}", metrics.male_pronouns);
        let _ = writeln!(report, "- Female pronouns: {}", metrics.female_pronouns);
        let _ = writeln!(report, "- Neutral pronouns: {}", metrics.neutral_pronouns);
        let _ = writeln!(
            report,
            "- Balance score: {:.2} (0-1, higher is better)\n",
            metrics.balance_score
        );

        if metrics.balance_score < 0.5 {
            report.push_str(
                "**Recommendation**: Consider using more inclusive language and balanced representation.\n",
            );
        } else {
            report.push_str("**Good**: Content shows balanced representation.\n");
        }

        report
    }

    /// Every known term with its inclusive alternative.
    pub fn inclusive_suggestions(&self) -> BTreeMap<&'static str, &'static str> {
        FAMILIES
            .iter()
            .flat_map(|f| f.alternatives.iter().copied())
            .chain(EXTRA_SUGGESTIONS)
            .collect()
    }
}
