//! Filesystem tool: read_file, confined to a workspace root

use async_trait::async_trait;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use toolweave_domain::tool::{
    ParamType, Tool, ToolCall, ToolCategory, ToolDefinition, ToolError, ToolMetadata, ToolOutput,
    ToolParameter,
};

/// Tool name constant
pub const READ_FILE: &str = "read_file";

/// Maximum file size to read (10 MB)
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024;

/// Get the tool definition for read_file
pub fn read_file_definition() -> ToolDefinition {
    ToolDefinition::new(
        READ_FILE,
        "Read a text file from the workspace. Paths are relative to the workspace root.",
    )
    .with_parameter(ToolParameter::new("path", "Path to the file to read", true))
    .with_parameter(
        ToolParameter::new(
            "offset",
            "Line number to start reading from (0-indexed)",
            false,
        )
        .with_type(ParamType::Number)
        .with_default(0),
    )
    .with_parameter(
        ToolParameter::new("limit", "Maximum number of lines to read", false)
            .with_type(ParamType::Number),
    )
}

/// Reads files under a fixed root directory
pub struct ReadFileTool {
    definition: ToolDefinition,
    root: PathBuf,
}

impl ReadFileTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            definition: read_file_definition(),
            root: root.into(),
        }
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from_definition(&self.definition)
            .with_category(ToolCategory::Filesystem)
            .with_tags(["file", "read"])
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let root = self.root.clone();
        let call = call.clone();
        tokio::task::spawn_blocking(move || read_file(&root, &call))
            .await
            .map_err(|e| ToolError::execution_failed(format!("read_file task failed: {}", e)))?
    }
}

/// Resolve `requested` against `root`, rejecting anything that escapes it.
///
/// Symlinks are resolved before the containment check.
pub(crate) fn resolve_within(root: &Path, requested: &str) -> Result<PathBuf, ToolError> {
    let root = root.canonicalize().map_err(|e| {
        ToolError::execution_failed(format!(
            "Workspace root '{}' is unavailable: {}",
            root.display(),
            e
        ))
    })?;

    let candidate = Path::new(requested);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let resolved = match joined.canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == ErrorKind::NotFound => return Err(ToolError::not_found(requested)),
        Err(e) => {
            return Err(ToolError::execution_failed(format!(
                "Failed to resolve '{}': {}",
                requested, e
            )));
        }
    };

    if !resolved.starts_with(&root) {
        return Err(ToolError::permission_denied(format!(
            "{} (outside the workspace root)",
            requested
        )));
    }

    Ok(resolved)
}

fn read_file(root: &Path, call: &ToolCall) -> Result<ToolOutput, ToolError> {
    let path_str = call.require_string("path").map_err(ToolError::invalid_argument)?;
    let path = resolve_within(root, path_str)?;

    if !path.is_file() {
        return Err(ToolError::invalid_argument(format!(
            "'{}' is not a file",
            path_str
        )));
    }

    let metadata = fs::metadata(&path).map_err(|e| {
        ToolError::execution_failed(format!("Failed to get file metadata: {}", e))
    })?;
    if metadata.len() > MAX_READ_SIZE {
        return Err(ToolError::invalid_argument(format!(
            "File too large ({} bytes). Maximum size is {} bytes",
            metadata.len(),
            MAX_READ_SIZE
        )));
    }

    let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ToolError::permission_denied(path_str),
        _ => ToolError::execution_failed(format!("Failed to read file: {}", e)),
    })?;

    let offset = call.get_i64("offset").unwrap_or(0).max(0) as usize;
    let limit = call.get_i64("limit").map(|l| l.max(0) as usize);

    let lines: Vec<&str> = content.lines().collect();
    let total_lines = lines.len();
    let start = offset.min(total_lines);
    let end = match limit {
        Some(l) => (start + l).min(total_lines),
        None => total_lines,
    };

    let output = if start == 0 && limit.is_none() {
        content.clone()
    } else {
        lines[start..end].join("\n")
    };

    Ok(ToolOutput::text(output).with_json(json!({
        "path": path_str,
        "total_lines": total_lines,
        "returned_lines": end - start,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use toolweave_domain::tool::StructuredOutput;

    fn workspace() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "one\ntwo\nthree\nfour\n").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.md"), "# inner").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_read_whole_file() {
        let dir = workspace();
        let tool = ReadFileTool::new(dir.path());

        let output = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", "notes.txt"))
            .await
            .unwrap();

        assert_eq!(output.content, "one\ntwo\nthree\nfour\n");
        let Some(StructuredOutput::Json { value }) = output.data else {
            panic!("expected json data");
        };
        assert_eq!(value["total_lines"], 4);
    }

    #[tokio::test]
    async fn test_read_with_offset_and_limit() {
        let dir = workspace();
        let tool = ReadFileTool::new(dir.path());

        let call = ToolCall::new(READ_FILE)
            .with_arg("path", "notes.txt")
            .with_arg("offset", 1)
            .with_arg("limit", 2);
        let output = tool.invoke(&call).await.unwrap();
        assert_eq!(output.content, "two\nthree");

        let past_end = ToolCall::new(READ_FILE)
            .with_arg("path", "notes.txt")
            .with_arg("offset", 10);
        assert_eq!(tool.invoke(&past_end).await.unwrap().content, "");
    }

    #[tokio::test]
    async fn test_read_nested_file() {
        let dir = workspace();
        let tool = ReadFileTool::new(dir.path());
        let output = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", "sub/inner.md"))
            .await
            .unwrap();
        assert_eq!(output.content, "# inner");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = workspace();
        let tool = ReadFileTool::new(dir.path());
        let err = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", "absent.txt"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_escaping_root_is_denied() {
        let outer = tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "s3cr3t").unwrap();
        let root = outer.path().join("root");
        fs::create_dir(&root).unwrap();
        let tool = ReadFileTool::new(&root);

        let relative = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", "../secret.txt"))
            .await
            .unwrap_err();
        assert_eq!(relative.code, "PERMISSION_DENIED");

        let absolute_path = outer.path().join("secret.txt");
        let absolute = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", absolute_path.to_str().unwrap()))
            .await
            .unwrap_err();
        assert_eq!(absolute.code, "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = workspace();
        let tool = ReadFileTool::new(dir.path());
        let err = tool
            .invoke(&ToolCall::new(READ_FILE).with_arg("path", "sub"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[test]
    fn test_metadata_category() {
        let tool = ReadFileTool::new(".");
        let metadata = tool.metadata();
        assert_eq!(metadata.category, ToolCategory::Filesystem);
        assert_eq!(metadata.name, READ_FILE);
    }
}
