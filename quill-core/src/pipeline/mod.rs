//! The six-stage research pipeline.
//!
//! `Coordinate -> Search -> Analyze -> Write -> FactCheck -> Edit -> Done`.
//! The order is fixed. Each stage's output is recorded in the
//! [`PipelineState`] as soon as it is produced, so both outcomes that end a
//! run early carry everything produced so far:
//!
//! - a stage with empty inputs halts the run with [`RunOutcome::Halted`];
//! - a generation failure aborts it with a [`PipelineFailure`].
//!
//! Search failures never abort a run; they show up as empty result lists.
//! Governance checks are not consulted here. Callers run them before and
//! after [`Pipeline::run`] and decide what to do with the findings.
//!
//! ## Example
//!
//! ```rust,ignore
//! use quill_core::{Depth, Pipeline, QuillConfig, RunOutcome};
//!
//! let pipeline = Pipeline::from_config(QuillConfig::from_env())?;
//! match pipeline.run("tidal energy", Depth::Medium).await? {
//!     RunOutcome::Completed(state) => println!("{}", state.final_article().unwrap_or_default()),
//!     RunOutcome::Halted { stage, reason, .. } => eprintln!("halted at {}: {}", stage, reason),
//! }
//! ```

mod agent;
mod stages;
mod state;

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::config::{Depth, QuillConfig};
use crate::error::{PipelineFailure, Result};
use crate::governance::DecisionLog;
use crate::llm::{OpenAICompatibleClient, TextGenerator};
use crate::search::{SearchClient, SerperClient};

pub use agent::AgentProfile;
pub use stages::{StageContext, StageResult};
pub use state::{
    AnalyzeOutput, CoordinateOutput, EditOutput, FactCheckOutput, PipelineState, SearchOutput,
    Slot, Stage, StageOutput, WriteOutput,
};

/// How a run ended, short of a collaborator failure.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// All six stages ran.
    Completed(PipelineState),
    /// `stage` found its inputs empty and did not run.
    Halted {
        stage: Stage,
        reason: String,
        state: PipelineState,
    },
}

impl RunOutcome {
    pub fn state(&self) -> &PipelineState {
        match self {
            Self::Completed(state) => state,
            Self::Halted { state, .. } => state,
        }
    }

    pub fn into_state(self) -> PipelineState {
        match self {
            Self::Completed(state) => state,
            Self::Halted { state, .. } => state,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Unwraps a stage result or ends the run with the partial state.
macro_rules! run_stage {
    ($state:ident, $stage:expr, $call:expr) => {{
        let result = $call.await;
        match result {
            Ok(StageResult::Produced(output)) => output,
            Ok(StageResult::Insufficient(reason)) => {
                warn!(stage = %$stage, reason = %reason, "pipeline halted");
                return Ok(RunOutcome::Halted {
                    stage: $stage,
                    reason,
                    state: $state,
                });
            }
            Err(source) => return Err(PipelineFailure::new($stage, $state, source)),
        }
    }};
}

/// Stores a stage output, failing the run if the slot was already written.
macro_rules! record {
    ($state:ident, $output:expr) => {{
        let output = $output;
        let stage = stage_of(&output);
        if let Err(source) = $state.record(output) {
            return Err(PipelineFailure::new(stage, $state, source));
        }
    }};
}

fn stage_of<T: StageOutput>(_: &T) -> Stage {
    T::STAGE
}

/// Fetches an earlier stage's output from the state.
macro_rules! require {
    ($state:ident, $stage:expr, $getter:ident) => {
        match $state.$getter() {
            Some(output) => output,
            None => {
                return Ok(RunOutcome::Halted {
                    stage: $stage,
                    reason: format!("missing {} output", stringify!($getter)),
                    state: $state,
                })
            }
        }
    };
}

/// Runs the six stages against a text generator and a search client.
pub struct Pipeline {
    generator: TextGenerator,
    search: Arc<dyn SearchClient>,
    config: QuillConfig,
    decision_log: Option<Arc<DecisionLog>>,
}

impl Pipeline {
    pub fn new(generator: TextGenerator, search: Arc<dyn SearchClient>, config: QuillConfig) -> Self {
        Self {
            generator,
            search,
            config,
            decision_log: None,
        }
    }

    /// Groq for generation and Serper for search, both from `config`.
    pub fn from_config(config: QuillConfig) -> Result<Self> {
        config.validate()?;
        let client = OpenAICompatibleClient::groq(&config)?;
        let generator = TextGenerator::new(Arc::new(client), config.generation_timeout());
        let search = SerperClient::from_config(&config)?;
        Ok(Self::new(generator, Arc::new(search), config))
    }

    /// Record one decision per completed stage in `log`.
    pub fn with_decision_log(mut self, log: Arc<DecisionLog>) -> Self {
        self.decision_log = Some(log);
        self
    }

    pub fn config(&self) -> &QuillConfig {
        &self.config
    }

    fn context(&self) -> StageContext<'_> {
        StageContext {
            generator: &self.generator,
            search: &self.search,
            config: &self.config,
            decision_log: self.decision_log.as_deref(),
        }
    }

    /// Run every stage in order for `topic` at `depth`.
    #[instrument(skip_all, fields(topic = %topic, depth = %depth))]
    pub async fn run(
        &self,
        topic: &str,
        depth: Depth,
    ) -> std::result::Result<RunOutcome, PipelineFailure> {
        info!("pipeline started");
        let ctx = self.context();
        let mut state = PipelineState::new(topic, depth);

        let output = run_stage!(
            state,
            Stage::Coordinate,
            stages::coordinate(&ctx, state.topic(), depth)
        );
        record!(state, output);

        let coordinate = require!(state, Stage::Search, coordinate);
        let output = run_stage!(state, Stage::Search, stages::search(&ctx, coordinate));
        record!(state, output);

        let search = require!(state, Stage::Analyze, search);
        let output = run_stage!(state, Stage::Analyze, stages::analyze(&ctx, search));
        record!(state, output);

        let analyze = require!(state, Stage::Write, analyze);
        let output = run_stage!(
            state,
            Stage::Write,
            stages::write(&ctx, state.topic(), depth, analyze)
        );
        record!(state, output);

        let write = require!(state, Stage::FactCheck, write);
        let output = run_stage!(state, Stage::FactCheck, stages::fact_check(&ctx, write));
        record!(state, output);

        let write = require!(state, Stage::Edit, write);
        let fact_check = require!(state, Stage::Edit, fact_check);
        let output = run_stage!(
            state,
            Stage::Edit,
            stages::edit(&ctx, write, fact_check)
        );
        record!(state, output);

        info!("pipeline completed");
        Ok(RunOutcome::Completed(state))
    }
}
