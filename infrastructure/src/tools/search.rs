//! Code-analysis tool: grep_search, confined to a workspace root

use super::file::resolve_within;
use async_trait::async_trait;
use glob::glob;
use regex::Regex;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use toolweave_domain::tool::{
    ParamType, Tool, ToolCall, ToolCategory, ToolDefinition, ToolError, ToolMetadata, ToolOutput,
    ToolParameter,
};

/// Tool name constant
pub const GREP_SEARCH: &str = "grep_search";

/// Hard cap on matches regardless of `max_results`
const MAX_RESULTS: usize = 1000;

/// Maximum file size for grep (5 MB)
const MAX_GREP_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Get the tool definition for grep_search
pub fn grep_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        GREP_SEARCH,
        "Search for a regex pattern within file contents in the workspace",
    )
    .with_parameter(ToolParameter::new("pattern", "Regex pattern to search for", true))
    .with_parameter(
        ToolParameter::new(
            "path",
            "File or directory to search in, relative to the workspace root",
            false,
        )
        .with_default("."),
    )
    .with_parameter(ToolParameter::new(
        "file_pattern",
        "Glob pattern to filter files (e.g., '**/*.rs')",
        false,
    ))
    .with_parameter(
        ToolParameter::new(
            "context_lines",
            "Number of context lines before and after each match",
            false,
        )
        .with_type(ParamType::Number)
        .with_default(0),
    )
    .with_parameter(
        ToolParameter::new("case_insensitive", "Perform case-insensitive search", false)
            .with_type(ParamType::Boolean)
            .with_default(false),
    )
    .with_parameter(
        ToolParameter::new("max_results", "Maximum number of matches to return", false)
            .with_type(ParamType::Number)
            .with_default(100),
    )
}

/// Regex search over files under a fixed root directory
pub struct GrepSearchTool {
    definition: ToolDefinition,
    root: PathBuf,
}

impl GrepSearchTool {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            definition: grep_search_definition(),
            root: root.into(),
        }
    }

    pub fn metadata(&self) -> ToolMetadata {
        ToolMetadata::from_definition(&self.definition)
            .with_category(ToolCategory::CodeAnalysis)
            .with_tags(["grep", "regex", "code"])
    }
}

#[async_trait]
impl Tool for GrepSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn invoke(&self, call: &ToolCall) -> Result<ToolOutput, ToolError> {
        let root = self.root.clone();
        let call = call.clone();
        tokio::task::spawn_blocking(move || grep_search(&root, &call))
            .await
            .map_err(|e| ToolError::execution_failed(format!("grep_search task failed: {}", e)))?
    }
}

fn grep_search(root: &Path, call: &ToolCall) -> Result<ToolOutput, ToolError> {
    let pattern_str = call
        .require_string("pattern")
        .map_err(ToolError::invalid_argument)?;
    let path_str = call.get_string("path").unwrap_or(".");
    let path = resolve_within(root, path_str)?;
    let root = root.canonicalize().map_err(|e| {
        ToolError::execution_failed(format!("Workspace root is unavailable: {}", e))
    })?;

    let file_pattern = call.get_string("file_pattern");
    if let Some(pattern) = file_pattern {
        check_file_pattern(pattern)?;
    }
    let context_lines = call.get_i64("context_lines").unwrap_or(0).max(0) as usize;
    let case_insensitive = call.get_bool("case_insensitive").unwrap_or(false);
    let max_results = call
        .get_i64("max_results")
        .map(|n| n.clamp(1, MAX_RESULTS as i64) as usize)
        .unwrap_or(MAX_RESULTS);

    let regex_pattern = if case_insensitive {
        format!("(?i){}", pattern_str)
    } else {
        pattern_str.to_string()
    };
    let regex = Regex::new(&regex_pattern)
        .map_err(|e| ToolError::invalid_argument(format!("Invalid regex pattern: {}", e)))?;

    let files = if path.is_file() {
        vec![path.clone()]
    } else {
        collect_files(&root, &path, file_pattern)
    };

    let mut results = Vec::new();
    let mut total_matches = 0usize;

    for file_path in files {
        if fs::metadata(&file_path).is_ok_and(|m| m.len() > MAX_GREP_FILE_SIZE) {
            continue;
        }
        let Ok(content) = fs::read_to_string(&file_path) else {
            continue;
        };

        let display = file_path
            .strip_prefix(&path)
            .ok()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(file_path.as_path())
            .display()
            .to_string();
        let lines: Vec<&str> = content.lines().collect();

        for (line_num, line) in lines.iter().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            total_matches += 1;
            if results.len() >= max_results {
                continue;
            }

            if context_lines > 0 {
                let start_line = line_num.saturating_sub(context_lines);
                let end_line = (line_num + context_lines + 1).min(lines.len());
                let mut block = format!("{}:", display);
                for (i, ctx_line) in lines[start_line..end_line].iter().enumerate() {
                    let actual = start_line + i + 1;
                    let marker = if actual == line_num + 1 { ">" } else { " " };
                    block.push_str(&format!("\n{}{}: {}", marker, actual, ctx_line));
                }
                results.push(block);
            } else {
                results.push(format!("{}:{}: {}", display, line_num + 1, line));
            }
        }
    }

    let output = if results.is_empty() {
        "No matches found".to_string()
    } else if total_matches > results.len() {
        format!(
            "{}\n... ({} of {} matches shown)",
            results.join("\n"),
            results.len(),
            total_matches
        )
    } else {
        results.join("\n")
    };

    Ok(ToolOutput::text(output).with_json(json!({
        "path": path_str,
        "match_count": total_matches,
    })))
}

/// Glob patterns are joined onto the search directory, so they must stay relative
/// and never climb out of it.
fn check_file_pattern(pattern: &str) -> Result<(), ToolError> {
    let escapes = Path::new(pattern).is_absolute()
        || pattern.starts_with(['/', '\\'])
        || pattern.split(['/', '\\']).any(|part| part == "..");
    if escapes {
        return Err(ToolError::permission_denied(format!(
            "file_pattern '{}' (outside the workspace root)",
            pattern
        )));
    }
    Ok(())
}

/// Collect files from a directory, optionally filtered by a glob pattern.
///
/// Hits whose canonical path leaves `root` (e.g. through a symlink) are dropped.
fn collect_files(root: &Path, dir: &Path, file_pattern: Option<&str>) -> Vec<PathBuf> {
    let pattern = file_pattern.unwrap_or("**/*");
    let full_pattern = format!("{}/{}", dir.display(), pattern);

    let mut files: Vec<PathBuf> = match glob(&full_pattern) {
        Ok(paths) => paths
            .flatten()
            .filter(|p| p.is_file())
            .filter(|p| p.canonicalize().is_ok_and(|c| c.starts_with(root)))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}
