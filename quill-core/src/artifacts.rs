//! Markdown artifacts of a run.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::pipeline::PipelineState;

pub const FINAL_ARTICLE: &str = "final_article.md";
pub const RESEARCH_PLAN: &str = "research_plan.md";
pub const FACT_CHECK_REPORT: &str = "fact_check_report.md";
pub const EDITING_REPORT: &str = "editing_report.md";

/// Write whichever of the four artifacts `state` has content for into `dir`.
///
/// Creates `dir` if needed. Returns the paths written, in the order above.
pub fn write_artifacts(state: &PipelineState, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let artifacts = [
        (FINAL_ARTICLE, state.final_article()),
        (
            RESEARCH_PLAN,
            state.coordinate().map(|c| c.summary.as_str()),
        ),
        (
            FACT_CHECK_REPORT,
            state.fact_check().map(|f| f.report.as_str()),
        ),
        (
            EDITING_REPORT,
            state.edit().map(|e| e.editing_report.as_str()),
        ),
    ];

    let mut written = Vec::new();
    for (name, content) in artifacts {
        let Some(content) = content.filter(|c| !c.trim().is_empty()) else {
            continue;
        };
        let path = dir.join(name);
        std::fs::write(&path, content)?;
        info!(path = %path.display(), "artifact written");
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Depth;
    use crate::pipeline::CoordinateOutput;
    use crate::skills::create_research_plan;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nothing_written_for_fresh_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = PipelineState::new("tides", Depth::Shallow);

        let written = write_artifacts(&state, dir.path()).unwrap();
        assert!(written.is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_partial_state_writes_plan_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/output");
        let mut state = PipelineState::new("tides", Depth::Shallow);
        state
            .record(CoordinateOutput {
                plan: create_research_plan("tides", Depth::Shallow),
                summary: "# Research Plan: tides\n".to_string(),
                strategy_notes: String::new(),
            })
            .unwrap();

        let written = write_artifacts(&state, &out).unwrap();
        assert_eq!(written, vec![out.join(RESEARCH_PLAN)]);
        assert_eq!(
            std::fs::read_to_string(out.join(RESEARCH_PLAN)).unwrap(),
            "# Research Plan: tides\n"
        );
    }

    #[test]
    fn test_blank_field_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = PipelineState::new("tides", Depth::Shallow);
        state
            .record(CoordinateOutput {
                plan: create_research_plan("tides", Depth::Shallow),
                summary: "  \n".to_string(),
                strategy_notes: String::new(),
            })
            .unwrap();

        assert!(write_artifacts(&state, dir.path()).unwrap().is_empty());
    }
}
