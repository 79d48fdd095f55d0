//! Tool domain traits
//!
//! Contains pure domain logic traits for tool validation.
//! The async ToolExecutorPort is defined in the application layer (ports).

use super::entities::{ToolCall, ToolDefinition};

/// Validator for tool calls
///
/// This is a pure domain trait that validates tool calls
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String>;
}

/// Default implementation of ToolValidator: every required parameter must be
/// present and non-null. Extra arguments are passed through untouched.
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), String> {
        for param in definition.required_parameters() {
            match call.args.get(&param.name) {
                None | Some(serde_json::Value::Null) => {
                    return Err(format!(
                        "Missing required parameter '{}' for tool '{}'",
                        param.name, definition.name
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}
