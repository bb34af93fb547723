//! Research planning: objectives, query tiers and task ordering.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::config::Depth;

/// The deterministic part of the Coordinate stage's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub topic: String,
    pub depth: Depth,
    pub objectives: Vec<String>,
    pub search_queries: Vec<String>,
    pub required_steps: Vec<String>,
}

/// Steps every run goes through after planning.
pub const REQUIRED_STEPS: [&str; 5] = [
    "Execute web searches for each query",
    "Analyze and synthesize gathered information",
    "Create structured content draft",
    "Verify facts and claims",
    "Review and polish final content",
];

/// Number of queries a plan issues for `depth`.
pub fn query_count(depth: Depth) -> usize {
    match depth {
        Depth::Shallow => 2,
        Depth::Medium => 5,
        Depth::Deep => 9,
    }
}

/// Build the plan for `topic` at `depth`.
pub fn create_research_plan(topic: &str, depth: Depth) -> ResearchPlan {
    ResearchPlan {
        topic: topic.to_string(),
        depth,
        objectives: objectives(topic, depth),
        search_queries: generate_search_queries(topic, depth),
        required_steps: REQUIRED_STEPS.iter().map(|s| s.to_string()).collect(),
    }
}

fn objectives(topic: &str, depth: Depth) -> Vec<String> {
    match depth {
        Depth::Shallow => vec![
            format!("Understand the basics of {}", topic),
            "Identify key concepts and definitions".to_string(),
        ],
        Depth::Medium => vec![
            format!("Understand the fundamentals of {}", topic),
            "Explore current trends and developments".to_string(),
            "Identify key players and experts".to_string(),
            "Understand practical applications".to_string(),
        ],
        Depth::Deep => vec![
            format!("Comprehensive analysis of {}", topic),
            "Historical context and evolution".to_string(),
            "Current state and trends".to_string(),
            "Future implications and predictions".to_string(),
            "Critical analysis and expert opinions".to_string(),
        ],
    }
}

/// Queries drawn from three tiers; deeper plans take more of each tier.
///
/// shallow: 2 base. medium: 3 base + 2 medium. deep: 3 base + 2 medium + 4 deep.
pub fn generate_search_queries(topic: &str, depth: Depth) -> Vec<String> {
    let base = [
        format!("{} overview", topic),
        format!("what is {}", topic),
        format!("{} latest trends 2024", topic),
    ];
    let medium = [
        format!("{} applications", topic),
        format!("{} benefits and challenges", topic),
        format!("{} expert insights", topic),
    ];
    let deep = [
        format!("{} history and evolution", topic),
        format!("{} future predictions", topic),
        format!("{} research papers", topic),
        format!("{} industry analysis", topic),
    ];

    let (base_n, medium_n, deep_n) = match depth {
        Depth::Shallow => (2, 0, 0),
        Depth::Medium => (3, 2, 0),
        Depth::Deep => (3, 2, 4),
    };

    base.into_iter()
        .take(base_n)
        .chain(medium.into_iter().take(medium_n))
        .chain(deep.into_iter().take(deep_n))
        .collect()
}

/// Task with an assigned priority (1 runs first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedTask {
    pub task: String,
    pub priority: u8,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    Done,
}

const TASK_PRIORITIES: [(&str, u8); 5] = [
    ("search", 1),
    ("analyze", 2),
    ("write", 3),
    ("verify", 4),
    ("edit", 5),
];

/// Rank tasks by the first pipeline keyword they mention. Stable for ties.
pub fn prioritize_tasks<S: AsRef<str>>(tasks: &[S]) -> Vec<PrioritizedTask> {
    let mut prioritized: Vec<_> = tasks
        .iter()
        .map(|task| {
            let lower = task.as_ref().to_lowercase();
            let priority = TASK_PRIORITIES
                .iter()
                .find(|(key, _)| lower.contains(key))
                .map_or(3, |(_, p)| *p);
            PrioritizedTask {
                task: task.as_ref().to_string(),
                priority,
                status: TaskStatus::Pending,
            }
        })
        .collect();
    prioritized.sort_by_key(|t| t.priority);
    prioritized
}

/// Markdown rendering of a plan.
pub fn workflow_summary(plan: &ResearchPlan) -> String {
    let mut out = format!("# Research Workflow for: {}\n\n", plan.topic);

    out.push_str("## Objectives\n");
    for (i, objective) in plan.objectives.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, objective);
    }

    out.push_str("\n## Search Strategy\n");
    out.push_str("The following queries will be executed:\n");
    for (i, query) in plan.search_queries.iter().enumerate() {
        let _ = writeln!(out, "{}. \"{}\"", i + 1, query);
    }

    out.push_str("\n## Execution Steps\n");
    for (i, step) in plan.required_steps.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, step);
    }

    out
}
