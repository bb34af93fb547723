//! The record threaded through the six stages.
//!
//! Every stage output lives in a write-once [`Slot`]. A stage reads the
//! outputs of earlier stages through shared references and can only add
//! its own; overwriting an already-filled slot is an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::{AgentKind, Depth};
use crate::error::{Error, Result};
use crate::search::{QueryResults, SearchResult};
use crate::skills::{EditingSuggestion, FactCheckResult, Readability, ResearchPlan, Verdict};

/// Pipeline position. Transitions are linear and unconditional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Coordinate,
    Search,
    Analyze,
    Write,
    FactCheck,
    Edit,
    Done,
}

impl Stage {
    /// The stages that do work, in execution order.
    pub const SEQUENCE: [Stage; 6] = [
        Stage::Coordinate,
        Stage::Search,
        Stage::Analyze,
        Stage::Write,
        Stage::FactCheck,
        Stage::Edit,
    ];

    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Coordinate => Some(Self::Search),
            Self::Search => Some(Self::Analyze),
            Self::Analyze => Some(Self::Write),
            Self::Write => Some(Self::FactCheck),
            Self::FactCheck => Some(Self::Edit),
            Self::Edit => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Coordinate => "coordinate",
            Self::Search => "search",
            Self::Analyze => "analyze",
            Self::Write => "write",
            Self::FactCheck => "fact_check",
            Self::Edit => "edit",
            Self::Done => "done",
        }
    }

    /// The agent that drives this stage.
    pub fn agent(&self) -> Option<AgentKind> {
        match self {
            Self::Coordinate => Some(AgentKind::ResearchCoordinator),
            Self::Search => Some(AgentKind::WebSearcher),
            Self::Analyze => Some(AgentKind::DataAnalyst),
            Self::Write => Some(AgentKind::ContentWriter),
            Self::FactCheck => Some(AgentKind::FactChecker),
            Self::Edit => Some(AgentKind::Editor),
            Self::Done => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value that can be written exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slot<T>(Option<T>);

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Slot<T> {
    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_filled(&self) -> bool {
        self.0.is_some()
    }

    /// Write the value. Fails if the slot already holds one.
    pub fn fill(&mut self, field: &'static str, value: T) -> Result<()> {
        if self.0.is_some() {
            return Err(Error::SlotAlreadyFilled { field });
        }
        self.0 = Some(value);
        Ok(())
    }
}

/// Output of the Coordinate stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateOutput {
    pub plan: ResearchPlan,
    /// Markdown rendering of the plan
    pub summary: String,
    /// Free-form strategy from the model; never changes the query list
    pub strategy_notes: String,
}

impl CoordinateOutput {
    pub fn search_queries(&self) -> &[String] {
        &self.plan.search_queries
    }
}

/// Output of the Search stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutput {
    /// One entry per planned query, in plan order
    pub results: Vec<QueryResults>,
    /// Rendered text of each query's results
    pub results_text: Vec<String>,
    pub summary: String,
}

impl SearchOutput {
    pub fn all_results(&self) -> impl Iterator<Item = &SearchResult> {
        self.results.iter().flat_map(|q| q.results.iter())
    }

    pub fn total_results(&self) -> usize {
        self.results.iter().map(|q| q.results.len()).sum()
    }
}

/// Output of the Analyze stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeOutput {
    pub key_points: Vec<String>,
    pub themes: Vec<String>,
    pub synthesized: String,
    pub analysis: String,
}

/// Output of the Write stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOutput {
    pub outline: Vec<String>,
    pub draft: String,
    pub word_count: usize,
    pub section_count: usize,
}

/// Output of the FactCheck stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactCheckOutput {
    pub claims: Vec<String>,
    pub results: Vec<FactCheckResult>,
    pub verdict_counts: BTreeMap<Verdict, usize>,
    pub report: String,
    pub assessment: String,
}

/// Output of the Edit stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutput {
    pub readability_before: Readability,
    pub readability_after: Readability,
    pub suggestions: Vec<EditingSuggestion>,
    pub final_article: String,
    pub improvements: usize,
    pub editing_report: String,
}

/// Ties a stage output type to its stage and its slot in [`PipelineState`].
pub trait StageOutput: Sized {
    const STAGE: Stage;

    fn slot(state: &mut PipelineState) -> &mut Slot<Self>;
}

macro_rules! stage_output {
    ($ty:ty, $stage:expr, $field:ident) => {
        impl StageOutput for $ty {
            const STAGE: Stage = $stage;

            fn slot(state: &mut PipelineState) -> &mut Slot<Self> {
                &mut state.$field
            }
        }
    };
}

stage_output!(CoordinateOutput, Stage::Coordinate, coordinate);
stage_output!(SearchOutput, Stage::Search, search);
stage_output!(AnalyzeOutput, Stage::Analyze, analyze);
stage_output!(WriteOutput, Stage::Write, write);
stage_output!(FactCheckOutput, Stage::FactCheck, fact_check);
stage_output!(EditOutput, Stage::Edit, edit);

/// Everything a run has produced so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineState {
    topic: String,
    depth: Depth,
    current_step: Option<Stage>,
    coordinate: Slot<CoordinateOutput>,
    search: Slot<SearchOutput>,
    analyze: Slot<AnalyzeOutput>,
    write: Slot<WriteOutput>,
    fact_check: Slot<FactCheckOutput>,
    edit: Slot<EditOutput>,
}

impl PipelineState {
    pub fn new(topic: impl Into<String>, depth: Depth) -> Self {
        Self {
            topic: topic.into(),
            depth,
            current_step: None,
            coordinate: Slot::default(),
            search: Slot::default(),
            analyze: Slot::default(),
            write: Slot::default(),
            fact_check: Slot::default(),
            edit: Slot::default(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn depth(&self) -> Depth {
        self.depth
    }

    /// The most recently completed stage, `Done` after Edit.
    pub fn current_step(&self) -> Option<Stage> {
        self.current_step
    }

    pub fn is_complete(&self) -> bool {
        self.current_step == Some(Stage::Done)
    }

    /// Store a stage's output and advance `current_step`.
    pub fn record<T: StageOutput>(&mut self, output: T) -> Result<()> {
        T::slot(self).fill(T::STAGE.as_str(), output)?;
        self.current_step = match T::STAGE {
            Stage::Edit => Some(Stage::Done),
            stage => Some(stage),
        };
        Ok(())
    }

    pub fn coordinate(&self) -> Option<&CoordinateOutput> {
        self.coordinate.get()
    }

    pub fn search(&self) -> Option<&SearchOutput> {
        self.search.get()
    }

    pub fn analyze(&self) -> Option<&AnalyzeOutput> {
        self.analyze.get()
    }

    pub fn write(&self) -> Option<&WriteOutput> {
        self.write.get()
    }

    pub fn fact_check(&self) -> Option<&FactCheckOutput> {
        self.fact_check.get()
    }

    pub fn edit(&self) -> Option<&EditOutput> {
        self.edit.get()
    }

    /// The edited article, once the run completed.
    pub fn final_article(&self) -> Option<&str> {
        self.edit().map(|e| e.final_article.as_str())
    }
}
