//! Console output formatter for agent responses and reports

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use rag_domain::{AgentDomain, AgentResponse, RetrievalResult, Source, ToolDefinition};

/// Printed under a degraded answer
pub const DEGRADED_WARNING: &str =
    "Live web data was unavailable; this answer is based on the local index only.";

/// One agent row of `hybrid-rag status`
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub domain: AgentDomain,
    pub collection: String,
    /// Document count, or why the collection could not be read
    pub documents: Result<usize, String>,
    /// Whether the agent may escalate to web search
    pub web_search: bool,
}

/// Formats agent responses for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Answer, sources with provenance, and the degraded warning if any
    pub fn format(response: &AgentResponse) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{} {}\n\n",
            "Agent:".cyan().bold(),
            response.domain
        ));
        output.push_str(response.answer.trim());
        output.push('\n');

        if !response.sources.is_empty() {
            output.push_str(&format!("\n{}\n", "Sources:".cyan().bold()));
            output.push_str(&Self::format_sources(&response.sources));
        }

        if response.degraded {
            output.push_str(&format!("\n{} {}\n", "Warning:".yellow().bold(), DEGRADED_WARNING.yellow()));
        }

        output
    }

    /// Format as JSON
    pub fn format_json(response: &AgentResponse) -> String {
        serde_json::to_string_pretty(response).unwrap_or_else(|_| "{}".to_string())
    }

    /// Numbered source list, one line per result
    pub fn format_sources(sources: &[RetrievalResult]) -> String {
        let mut output = String::new();
        for source in sources {
            output.push_str(&format!(
                "  {:>2}. {} {} {}\n",
                source.rank,
                Self::provenance(source.source),
                source.title.bold(),
                format!("({}, score {:.2})", source.id_or_url, source.score).dimmed()
            ));
        }
        output
    }

    /// `[local index]` or `[web]`, colored by origin
    pub fn provenance(source: Source) -> String {
        let label = format!("[{}]", source.label());
        match source {
            Source::Local => label.green().to_string(),
            Source::Web => label.blue().to_string(),
        }
    }

    pub fn format_status(entries: &[StatusEntry]) -> String {
        let mut output = format!("{}\n{}\n", "Agents".cyan().bold(), "-".repeat(40));
        for entry in entries {
            let documents = match &entry.documents {
                Ok(count) => format!("{} documents", count),
                Err(reason) => format!("unavailable ({})", reason).red().to_string(),
            };
            let escalation = if entry.web_search {
                "web fallback".green()
            } else {
                "local only".dimmed()
            };
            output.push_str(&format!(
                "  {:<12} {:<16} {}  {}\n",
                entry.domain.as_str().bold(),
                entry.collection,
                documents,
                escalation
            ));
        }
        output
    }

    pub fn format_status_json(entries: &[StatusEntry]) -> String {
        let rows: Vec<_> = entries
            .iter()
            .map(|e| {
                serde_json::json!({
                    "domain": e.domain,
                    "collection": e.collection,
                    "documents": e.documents.as_ref().ok(),
                    "error": e.documents.as_ref().err(),
                    "web_search": e.web_search,
                })
            })
            .collect();
        serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn format_tools<'a>(tools: impl IntoIterator<Item = &'a ToolDefinition>) -> String {
        let mut output = format!("{}\n{}\n", "Tools".cyan().bold(), "-".repeat(40));
        for tool in tools {
            output.push_str(&format!("  {}  {}\n", tool.name.bold(), tool.description));
            for param in &tool.parameters {
                let required = if param.required { "required" } else { "optional" };
                output.push_str(&format!(
                    "      {} ({}, {}) {}\n",
                    param.name,
                    param.param_type,
                    required,
                    param.description.dimmed()
                ));
            }
        }
        output
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, response: &AgentResponse) -> String {
        Self::format(response)
    }

    fn format_json(&self, response: &AgentResponse) -> String {
        Self::format_json(response)
    }
}
