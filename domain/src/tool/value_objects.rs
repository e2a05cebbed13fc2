//! Tool domain value objects — immutable output and error types
//!
//! These types form the **output side** of the tool pipeline. A tool
//! implementation returns a [`ToolOutput`] or a [`ToolError`]; the executor
//! folds either into a [`ToolResult`], which is what the orchestration loop
//! records in the transcript and the deduplication cache.

use serde::{Deserialize, Serialize};

/// Error that occurred while validating or executing a tool call.
///
/// | Code | Raised by |
/// |------|-----------|
/// | `NOT_FOUND` | Unknown tool or missing resource |
/// | `INVALID_ARGUMENT` | Schema validation, bad argument values |
/// | `EXECUTION_FAILED` | Tool runtime failure (I/O, HTTP, panic) |
/// | `PERMISSION_DENIED` | Access outside the allowed scope |
/// | `TIMEOUT` | Operation timed out |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code (e.g., "NOT_FOUND", "PERMISSION_DENIED")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ToolError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    // Common error constructors
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("Resource not found: {}", resource.into()),
        )
    }

    pub fn permission_denied(resource: impl Into<String>) -> Self {
        Self::new(
            "PERMISSION_DENIED",
            format!("Permission denied: {}", resource.into()),
        )
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new("INVALID_ARGUMENT", message)
    }

    pub fn execution_failed(message: impl Into<String>) -> Self {
        Self::new("EXECUTION_FAILED", message)
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        Self::new(
            "TIMEOUT",
            format!("Operation timed out: {}", operation.into()),
        )
    }
}

impl std::fmt::Display for ToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ToolError {}

/// One document returned by a retrieval tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub document_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl RetrievedDocument {
    pub fn new(document_id: impl Into<String>, score: f64) -> Self {
        Self {
            document_id: document_id.into(),
            page: None,
            score,
            text: None,
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Structured payload a tool may return next to its text content.
///
/// Citation extraction pattern-matches on
/// [`StructuredOutput::Documents`] instead of probing arbitrary JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StructuredOutput {
    /// Documents returned by a retrieval tool
    Documents { documents: Vec<RetrievedDocument> },
    /// Any other structured value
    Json { value: serde_json::Value },
}

impl StructuredOutput {
    pub fn documents(&self) -> &[RetrievedDocument] {
        match self {
            StructuredOutput::Documents { documents } => documents,
            StructuredOutput::Json { .. } => &[],
        }
    }
}

/// What a tool implementation hands back on success
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub content: String,
    pub data: Option<StructuredOutput>,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            data: None,
        }
    }

    pub fn with_documents(mut self, documents: Vec<RetrievedDocument>) -> Self {
        self.data = Some(StructuredOutput::Documents { documents });
        self
    }

    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.data = Some(StructuredOutput::Json { value });
        self
    }
}

/// Result of a tool execution, carrying output or error information.
///
/// Exactly one side is populated: a successful result has `output` (and
/// possibly `data`), a failed one has `error`. Use the constructors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Name of the tool that was executed
    pub tool_name: String,
    /// Whether the execution was successful
    pub success: bool,
    /// Output content (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Structured payload (for successful execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<StructuredOutput>,
    /// Error information (for failed execution)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
    /// Duration of execution in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.into()),
            data: None,
            error: None,
            duration_ms: None,
        }
    }

    /// Create a successful result from a tool's output
    pub fn from_output(tool_name: impl Into<String>, output: ToolOutput) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            output: Some(output.content),
            data: output.data,
            error: None,
            duration_ms: None,
        }
    }

    /// Create a failed result
    pub fn failure(tool_name: impl Into<String>, error: ToolError) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            output: None,
            data: None,
            error: Some(error),
            duration_ms: None,
        }
    }

    /// Add duration metadata
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Check if execution was successful
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Get the output content
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Get the error
    pub fn error(&self) -> Option<&ToolError> {
        self.error.as_ref()
    }

    /// Documents carried in the structured payload, if any
    pub fn documents(&self) -> &[RetrievedDocument] {
        self.data.as_ref().map(|d| d.documents()).unwrap_or(&[])
    }

    /// Text the model sees for this result
    pub fn display_content(&self) -> String {
        match (&self.output, &self.error) {
            (Some(output), _) => output.clone(),
            (None, Some(error)) => format!("Error: {}", error.message),
            (None, None) => String::new(),
        }
    }
}
