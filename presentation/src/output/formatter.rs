//! Output formatter trait

use crate::cli::commands::OutputFormat;
use rag_domain::AgentResponse;

/// Trait for formatting agent responses
pub trait OutputFormatter {
    /// Human-readable rendering with provenance
    fn format(&self, response: &AgentResponse) -> String;

    /// Format as JSON
    fn format_json(&self, response: &AgentResponse) -> String;

    /// Render in the requested format
    fn render(&self, response: &AgentResponse, format: OutputFormat) -> String {
        match format {
            OutputFormat::Text => self.format(response),
            OutputFormat::Json => self.format_json(response),
        }
    }
}
