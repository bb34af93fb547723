//! Agent profiles: who speaks to the model in each stage.

use crate::config::{AgentKind, QuillConfig};
use crate::llm::GenerationSettings;

/// Name, role and skills of one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentProfile {
    pub kind: AgentKind,
    pub name: &'static str,
    pub role: &'static str,
    pub skills: &'static [&'static str],
}

impl AgentProfile {
    pub fn for_kind(kind: AgentKind) -> Self {
        match kind {
            AgentKind::ResearchCoordinator => Self::new(
                kind,
                "Research Coordinator",
                "Strategic planning and workflow coordination",
                &["Planning"],
            ),
            AgentKind::WebSearcher => Self::new(
                kind,
                "Web Search Agent",
                "Information retrieval and web search specialist",
                &["Search"],
            ),
            AgentKind::DataAnalyst => Self::new(
                kind,
                "Data Analyst",
                "Information analysis and synthesis specialist",
                &["Analysis"],
            ),
            AgentKind::ContentWriter => Self::new(
                kind,
                "Content Writer",
                "Professional content creation specialist",
                &["Writing"],
            ),
            AgentKind::FactChecker => Self::new(
                kind,
                "Fact Checker",
                "Fact verification and accuracy specialist",
                &["FactChecking", "Search"],
            ),
            AgentKind::Editor => Self::new(
                kind,
                "Editor",
                "Content quality assurance and editing specialist",
                &["Editing"],
            ),
        }
    }

    const fn new(
        kind: AgentKind,
        name: &'static str,
        role: &'static str,
        skills: &'static [&'static str],
    ) -> Self {
        Self {
            kind,
            name,
            role,
            skills,
        }
    }

    /// System role sent with every generation call this agent makes.
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}, a specialized AI agent.\n\n\
             Role: {}\n\n\
             Skills: You have access to the following capabilities: {}\n\n\
             Your task is to use your skills effectively to accomplish your specific role \
             in the research and content creation workflow.\n\
             Be concise, accurate, and focused on your designated responsibilities.\n",
            self.name,
            self.role,
            self.skills.join(", ")
        )
    }

    pub fn settings(&self, config: &QuillConfig) -> GenerationSettings {
        GenerationSettings {
            model: Some(config.model.clone()),
            temperature: config.temperatures.for_agent(self.kind),
            max_tokens: config.max_tokens,
        }
    }
}
