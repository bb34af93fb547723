//! The six stage functions.
//!
//! Each stage takes the typed outputs of the stages it depends on, runs its
//! deterministic skill work, makes exactly one generation call and returns
//! its own output. A stage whose inputs are empty returns
//! [`StageResult::Insufficient`] without calling the model.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::{AgentKind, Depth, QuillConfig};
use crate::error::{Error, Result};
use crate::governance::{DecisionLog, DecisionLogEntry};
use crate::llm::{truncate_chars, PromptTemplate, TemplateVars, TextGenerator};
use crate::search::{format_results_text, search_all, SearchClient};
use crate::skills::{
    create_outline, create_research_plan, editing_report, extract_key_points, fact_check_report,
    identify_themes, mean_confidence, polish, readability, section_count, suggestions, synthesize,
    verdict_counts, word_count, workflow_summary, Capability, CapabilityOutcome, ClaimVerifier,
    ReadabilityRating, Toolkit,
};

use super::agent::AgentProfile;
use super::state::{
    AnalyzeOutput, CoordinateOutput, EditOutput, FactCheckOutput, SearchOutput, Stage,
    WriteOutput,
};

const SEARCH_RESULTS_CHARS: usize = 4000;
const ANALYSIS_DATA_CHARS: usize = 4000;
const WRITER_ANALYSIS_CHARS: usize = 2000;
const FACT_CHECK_CONTENT_CHARS: usize = 2000;
const EDIT_REPORT_CHARS: usize = 1000;
const EDIT_ASSESSMENT_CHARS: usize = 500;

/// Sentences kept as key points, and search hits fed to the analyst.
const KEY_POINTS: usize = 5;
const ANALYZED_SOURCES: usize = 5;

const COORDINATE_PROMPT: PromptTemplate = PromptTemplate::new(
    "Create an enhanced research strategy for the topic: {topic}

The initial plan includes:
- Objectives: {objectives}
- Search Queries: {queries}

Please provide:
1. Any additional important search queries
2. Key aspects to focus on
3. Potential challenges to be aware of

Be concise and strategic.",
);

const SEARCH_PROMPT: PromptTemplate = PromptTemplate::new(
    "Review these search results and create a structured summary:

{results}

Provide:
1. Key findings (top 5-7 most important points)
2. Common themes across sources
3. Notable sources and their main contributions

Be concise and focus on the most relevant information.",
);

const ANALYZE_PROMPT: PromptTemplate = PromptTemplate::new(
    "Analyze this research data in depth:

{data}

Provide:
1. Core Insights: The 5-7 most important insights
2. Data Patterns: Key patterns or trends identified
3. Knowledge Gaps: What information might be missing
4. Recommendations: What aspects should the content emphasize

Format your response clearly with headings.",
);

const WRITE_PROMPT: PromptTemplate = PromptTemplate::new(
    "Create a comprehensive, well-written article on: {topic}

Use this research and analysis:
{analysis}

Key points to cover:
{key_points}

Requirements:
- Write an engaging introduction
- Create 3-5 main sections with clear headings
- Use concrete examples and insights from the research
- Include a strong conclusion
- Aim for approximately {target_words} words
- Use markdown formatting

Write the complete article now.",
);

const FACT_CHECK_PROMPT: PromptTemplate = PromptTemplate::new(
    "Review this fact-check report:

{report}

Content being checked:
{content}

Provide:
1. Overall Assessment: How accurate is the content?
2. Critical Issues: Any claims that need immediate attention
3. Recommendations: Suggested corrections or clarifications
4. Confidence Score: Rate the overall factual accuracy (0-100%)

Be precise and cite specific concerns.",
);

const EDIT_PROMPT: PromptTemplate = PromptTemplate::new(
    "Review and improve this content:

{content}

Editing Report:
{editing_report}

Fact-Check Assessment:
{fact_check}

Tasks:
1. Fix any grammatical or structural issues
2. Improve clarity and flow
3. Ensure consistent tone and style
4. Address any fact-checking concerns
5. Polish the final presentation

Provide the complete, improved version of the article. Maintain all the key information while enhancing quality.",
);

/// What a stage produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StageResult<T> {
    Produced(T),
    /// Required inputs were missing or empty; the model was not called.
    Insufficient(String),
}

impl<T> StageResult<T> {
    fn insufficient(reason: &str) -> Self {
        Self::Insufficient(reason.to_string())
    }
}

/// Collaborators shared by every stage of one run.
pub struct StageContext<'a> {
    pub generator: &'a TextGenerator,
    pub search: &'a Arc<dyn SearchClient>,
    pub config: &'a QuillConfig,
    pub decision_log: Option<&'a DecisionLog>,
}

impl StageContext<'_> {
    async fn generate(
        &self,
        stage: Stage,
        agent: AgentKind,
        instruction: &PromptTemplate,
        variables: &TemplateVars,
    ) -> Result<String> {
        let profile = AgentProfile::for_kind(agent);
        self.generator
            .invoke(
                &profile.system_prompt(),
                instruction,
                variables,
                &profile.settings(self.config),
            )
            .await
            .map_err(|e| Error::generation(stage, e.to_string()))
    }

    fn log(&self, entry: DecisionLogEntry) {
        if let Some(log) = self.decision_log {
            log.append(entry);
        }
    }
}

fn agent_name(agent: AgentKind) -> &'static str {
    AgentProfile::for_kind(agent).name
}

/// Build the research plan and ask the coordinator for strategy notes.
#[instrument(skip_all, fields(stage = "coordinate", topic = %topic, depth = %depth))]
pub async fn coordinate(
    ctx: &StageContext<'_>,
    topic: &str,
    depth: Depth,
) -> Result<StageResult<CoordinateOutput>> {
    if topic.trim().is_empty() {
        return Ok(StageResult::insufficient("No topic provided"));
    }

    let plan = create_research_plan(topic, depth);
    let summary = workflow_summary(&plan);

    let mut vars = TemplateVars::new();
    vars.insert("topic", topic.to_string());
    vars.insert("objectives", plan.objectives.join(", "));
    vars.insert("queries", plan.search_queries.join(", "));
    let strategy_notes = ctx
        .generate(
            Stage::Coordinate,
            AgentKind::ResearchCoordinator,
            &COORDINATE_PROMPT,
            &vars,
        )
        .await?;

    info!(queries = plan.search_queries.len(), "research plan created");
    ctx.log(DecisionLogEntry::new(
        agent_name(AgentKind::ResearchCoordinator),
        topic,
        &summary,
        format!(
            "Planned {} search queries at {} depth",
            plan.search_queries.len(),
            depth
        ),
        1.0,
    ));

    Ok(StageResult::Produced(CoordinateOutput {
        plan,
        summary,
        strategy_notes,
    }))
}

/// Run every planned query and summarize the combined results.
#[instrument(skip_all, fields(stage = "search", queries = coordinate.search_queries().len()))]
pub async fn search(
    ctx: &StageContext<'_>,
    coordinate: &CoordinateOutput,
) -> Result<StageResult<SearchOutput>> {
    let queries = coordinate.search_queries();
    if queries.is_empty() {
        return Ok(StageResult::insufficient("No search queries provided"));
    }

    let results = search_all(
        Arc::clone(ctx.search),
        queries,
        ctx.config.results_per_query,
        ctx.config.search_concurrency,
        ctx.config.search_timeout(),
    )
    .await;

    let results_text: Vec<String> = results
        .iter()
        .map(|q| format_results_text(&q.query, &q.results))
        .collect();
    let combined = results_text.join("\n\n");

    let mut vars = TemplateVars::new();
    vars.insert(
        "results",
        truncate_chars(&combined, SEARCH_RESULTS_CHARS).to_string(),
    );
    let summary = ctx
        .generate(Stage::Search, AgentKind::WebSearcher, &SEARCH_PROMPT, &vars)
        .await?;

    let output = SearchOutput {
        results,
        results_text,
        summary,
    };

    let answered = output
        .results
        .iter()
        .filter(|q| !q.results.is_empty())
        .count();
    info!(
        total_results = output.total_results(),
        answered, "search completed"
    );
    ctx.log(
        DecisionLogEntry::new(
            agent_name(AgentKind::WebSearcher),
            &queries.join("\n"),
            &output.summary,
            format!("{} of {} queries returned results", answered, queries.len()),
            answered as f64 / queries.len() as f64,
        )
        .with_sources(output.all_results().map(|r| r.link.clone()).collect()),
    );

    Ok(StageResult::Produced(output))
}

/// Extract key points and themes, then ask for a deeper analysis.
#[instrument(skip_all, fields(stage = "analyze"))]
pub async fn analyze(
    ctx: &StageContext<'_>,
    search: &SearchOutput,
) -> Result<StageResult<AnalyzeOutput>> {
    let sources: Vec<String> = search
        .all_results()
        .take(ANALYZED_SOURCES)
        .map(|r| format!("{}: {} ({})", r.title, r.snippet, r.link))
        .collect();

    if search.summary.trim().is_empty() && sources.is_empty() {
        return Ok(StageResult::insufficient("No data provided for analysis"));
    }

    let synthesized = if sources.is_empty() {
        search.summary.clone()
    } else {
        synthesize(&sources)
    };
    let key_points = extract_key_points(&synthesized, KEY_POINTS);
    let themes = identify_themes(&synthesized);

    let mut vars = TemplateVars::new();
    vars.insert(
        "data",
        truncate_chars(&synthesized, ANALYSIS_DATA_CHARS).to_string(),
    );
    let analysis = ctx
        .generate(Stage::Analyze, AgentKind::DataAnalyst, &ANALYZE_PROMPT, &vars)
        .await?;

    info!(key_points = key_points.len(), themes = %themes.join(", "), "analysis completed");
    ctx.log(DecisionLogEntry::new(
        agent_name(AgentKind::DataAnalyst),
        &synthesized,
        &analysis,
        format!(
            "Extracted {} key points across themes: {}",
            key_points.len(),
            themes.join(", ")
        ),
        key_points.len().min(KEY_POINTS) as f64 / KEY_POINTS as f64,
    ));

    Ok(StageResult::Produced(AnalyzeOutput {
        key_points,
        themes,
        synthesized,
        analysis,
    }))
}

/// Outline the article and have the writer draft it.
#[instrument(skip_all, fields(stage = "write", topic = %topic))]
pub async fn write(
    ctx: &StageContext<'_>,
    topic: &str,
    depth: Depth,
    analysis: &AnalyzeOutput,
) -> Result<StageResult<WriteOutput>> {
    if analysis.key_points.is_empty() && analysis.analysis.trim().is_empty() {
        return Ok(StageResult::insufficient(
            "Insufficient data for content creation",
        ));
    }

    let outline = create_outline(topic, &analysis.key_points);
    let key_points = analysis
        .key_points
        .iter()
        .take(KEY_POINTS)
        .map(|p| format!("- {}", p))
        .collect::<Vec<_>>()
        .join("\n");

    let mut vars = TemplateVars::new();
    vars.insert("topic", topic.to_string());
    vars.insert(
        "analysis",
        truncate_chars(&analysis.analysis, WRITER_ANALYSIS_CHARS).to_string(),
    );
    vars.insert("key_points", key_points);
    vars.insert(
        "target_words",
        ctx.config.target_word_count.get(depth).to_string(),
    );
    let generated = ctx
        .generate(Stage::Write, AgentKind::ContentWriter, &WRITE_PROMPT, &vars)
        .await?;

    let draft = polish(&generated);
    let output = WriteOutput {
        word_count: word_count(&draft),
        section_count: section_count(&draft),
        outline,
        draft,
    };

    info!(
        words = output.word_count,
        sections = output.section_count,
        "draft created"
    );
    ctx.log(DecisionLogEntry::new(
        agent_name(AgentKind::ContentWriter),
        &analysis.analysis,
        &output.draft,
        format!(
            "Drafted {} words in {} sections",
            output.word_count, output.section_count
        ),
        if output.section_count > 0 { 1.0 } else { 0.5 },
    ));

    Ok(StageResult::Produced(output))
}

/// Verify the draft's claims and ask for an accuracy assessment.
#[instrument(skip_all, fields(stage = "fact_check"))]
pub async fn fact_check(
    ctx: &StageContext<'_>,
    write: &WriteOutput,
) -> Result<StageResult<FactCheckOutput>> {
    let content = &write.draft;
    if content.trim().is_empty() {
        return Ok(StageResult::insufficient(
            "No content provided for fact-checking",
        ));
    }

    let toolkit = Toolkit::new(ClaimVerifier::new(
        Arc::clone(ctx.search),
        ctx.config.search_timeout(),
    ));
    let results = match toolkit.apply(Capability::Verify, content).await {
        CapabilityOutcome::Verify(results) => results,
        other => {
            return Err(Error::Internal(format!(
                "verify returned a {} outcome",
                other.capability()
            )))
        }
    };
    let claims: Vec<String> = results.iter().map(|r| r.claim.clone()).collect();
    let report = fact_check_report(&results);

    let mut vars = TemplateVars::new();
    vars.insert("report", report.clone());
    vars.insert(
        "content",
        truncate_chars(content, FACT_CHECK_CONTENT_CHARS).to_string(),
    );
    let assessment = ctx
        .generate(
            Stage::FactCheck,
            AgentKind::FactChecker,
            &FACT_CHECK_PROMPT,
            &vars,
        )
        .await?;

    let counts = verdict_counts(&results);
    let confidence = mean_confidence(&results);
    debug!(?counts, "verdicts");
    info!(claims = claims.len(), confidence, "fact check completed");

    let sources = results
        .iter()
        .flat_map(|r| r.supporting_sources.iter().cloned())
        .collect();
    ctx.log(
        DecisionLogEntry::new(
            agent_name(AgentKind::FactChecker),
            content,
            &report,
            format!("Verified {} claims against search results", claims.len()),
            confidence,
        )
        .with_sources(sources),
    );

    Ok(StageResult::Produced(FactCheckOutput {
        claims,
        results,
        verdict_counts: counts,
        report,
        assessment,
    }))
}

/// Review the draft and have the editor produce the final article.
#[instrument(skip_all, fields(stage = "edit"))]
pub async fn edit(
    ctx: &StageContext<'_>,
    write: &WriteOutput,
    fact_check: &FactCheckOutput,
) -> Result<StageResult<EditOutput>> {
    let content = &write.draft;
    if content.trim().is_empty() {
        return Ok(StageResult::insufficient("No content provided for editing"));
    }

    let readability_before = readability(content);
    let suggestions = suggestions(content);
    let report = editing_report(content);

    let assessment = if fact_check.assessment.trim().is_empty() {
        "No issues found"
    } else {
        truncate_chars(&fact_check.assessment, EDIT_ASSESSMENT_CHARS)
    };

    let mut vars = TemplateVars::new();
    vars.insert("content", content.clone());
    vars.insert(
        "editing_report",
        truncate_chars(&report, EDIT_REPORT_CHARS).to_string(),
    );
    vars.insert("fact_check", assessment.to_string());
    let generated = ctx
        .generate(Stage::Edit, AgentKind::Editor, &EDIT_PROMPT, &vars)
        .await?;

    let final_article = polish(&generated);
    let readability_after = readability(&final_article);
    let improvements = suggestions.len();

    info!(
        improvements,
        readability = %readability_after.rating,
        "editing completed"
    );
    ctx.log(DecisionLogEntry::new(
        agent_name(AgentKind::Editor),
        content,
        &final_article,
        format!("Applied {} editing suggestions", improvements),
        match readability_after.rating {
            ReadabilityRating::Good => 1.0,
            ReadabilityRating::NeedsImprovement => 0.7,
        },
    ));

    Ok(StageResult::Produced(EditOutput {
        readability_before,
        readability_after,
        suggestions,
        final_article,
        improvements,
        editing_report: report,
    }))
}
