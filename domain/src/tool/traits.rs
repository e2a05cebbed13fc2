//! Tool domain traits
//!
//! [`Tool`] is the invocable capability registered in the catalog.
//! [`ToolValidator`] is pure domain logic checking a call against a
//! definition; the async execution boundary lives in the application layer.

use async_trait::async_trait;
use std::collections::HashSet;
use thiserror::Error;

use super::entities::{ToolCall, ToolDefinition, json_type_name};
use super::value_objects::{ToolError, ToolOutput};

/// An invocable capability with a declared parameter schema.
///
/// Implementations return `Err` for expected failures; the executor also
/// catches panics, so a misbehaving tool never takes the request down.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declared name, description and parameters
    fn definition(&self) -> &ToolDefinition;

    /// Invoke the tool with validated arguments (defaults already applied)
    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError>;

    fn name(&self) -> &str {
        &self.definition().name
    }
}

/// Why a tool call was rejected before execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown tool '{0}'")]
    UnknownTool(String),

    #[error("Missing required parameter '{param}' for tool '{tool}'")]
    MissingParameter { tool: String, param: String },

    #[error("Unknown parameter '{param}' for tool '{tool}'")]
    UnknownParameter { tool: String, param: String },

    #[error("Parameter '{param}' for tool '{tool}' expects {expected}, got {actual}")]
    TypeMismatch {
        tool: String,
        param: String,
        expected: String,
        actual: String,
    },

    #[error("Parameter '{param}' for tool '{tool}' must be one of: {allowed}")]
    NotAllowed {
        tool: String,
        param: String,
        allowed: String,
    },
}

impl From<ValidationError> for ToolError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::UnknownTool(_) => ToolError::new("NOT_FOUND", err.to_string()),
            other => ToolError::invalid_argument(other.to_string()),
        }
    }
}

/// Validator for tool calls
///
/// This is a pure domain trait that validates tool calls
/// against their definitions without any I/O operations.
pub trait ToolValidator {
    /// Validate a tool call against its definition
    fn validate(&self, call: &ToolCall, definition: &ToolDefinition) -> Result<(), ValidationError>;
}

/// Default implementation of ToolValidator
#[derive(Debug, Clone, Default)]
pub struct DefaultToolValidator;

impl ToolValidator for DefaultToolValidator {
    fn validate(
        &self,
        call: &ToolCall,
        definition: &ToolDefinition,
    ) -> Result<(), ValidationError> {
        let args = call.arguments();

        // Check that all required parameters are present
        for param in definition.required_parameters() {
            if !args.contains_key(&param.name) {
                return Err(ValidationError::MissingParameter {
                    tool: definition.name.clone(),
                    param: param.name.clone(),
                });
            }
        }

        // Check that all provided arguments are valid parameters
        let valid_params: HashSet<&str> =
            definition.parameters.iter().map(|p| p.name.as_str()).collect();

        for arg_name in args.keys() {
            if !valid_params.contains(arg_name.as_str()) {
                return Err(ValidationError::UnknownParameter {
                    tool: definition.name.clone(),
                    param: arg_name.clone(),
                });
            }
        }

        for param in &definition.parameters {
            let Some(value) = args.get(&param.name) else {
                continue;
            };

            // An explicit null on an optional parameter means "not given"
            if value.is_null() && !param.required {
                continue;
            }

            if !param.param_type.accepts(value) {
                return Err(ValidationError::TypeMismatch {
                    tool: definition.name.clone(),
                    param: param.name.clone(),
                    expected: param.param_type.to_string(),
                    actual: json_type_name(value).to_string(),
                });
            }

            if let Some(allowed) = &param.allowed_values
                && !allowed.contains(value)
            {
                return Err(ValidationError::NotAllowed {
                    tool: definition.name.clone(),
                    param: param.name.clone(),
                    allowed: allowed
                        .iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }

        Ok(())
    }
}
