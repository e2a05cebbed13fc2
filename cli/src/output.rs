//! Console output for agent responses and streamed events

use colored::Colorize;
use toolweave_application::AgentEvent;
use toolweave_domain::core::string::{single_line, truncate};
use toolweave_domain::{AgentOutcome, AgentResponse, RegisteredTool, ToolCall};

/// Width of one-line previews of arguments and results
const PREVIEW_LEN: usize = 100;

/// Formats agent results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Answer, cited sources and a metrics summary
    pub fn format(response: &AgentResponse) -> String {
        let mut output = String::new();

        output.push_str(&response.answer);
        output.push_str("\n\n");

        if !response.citations.is_empty() {
            output.push_str(&format!("{}\n", "Sources:".cyan().bold()));
            for citation in &response.citations {
                let page = citation
                    .page
                    .map(|p| format!(", page {}", p))
                    .unwrap_or_default();
                output.push_str(&format!(
                    "  * {}{} (score {:.2})\n",
                    citation.document_id, page, citation.score
                ));
            }
            output.push('\n');
        }

        output.push_str(&Self::format_metrics(response));
        output
    }

    pub fn format_metrics(response: &AgentResponse) -> String {
        let metrics = &response.metrics;
        let outcome = match response.outcome {
            AgentOutcome::Finalized => response.outcome.as_str().green(),
            AgentOutcome::BudgetExhausted => response.outcome.as_str().yellow(),
        };
        let usage = metrics
            .tool_usage
            .iter()
            .map(|(name, count)| format!("{}={}", name, count))
            .collect::<Vec<_>>()
            .join(", ");

        let mut line = format!(
            "{} {} | iterations: {} | tool calls: {} | documents: {} | {} ms | ~${:.4}",
            "Outcome:".dimmed(),
            outcome,
            response.iterations,
            metrics.tool_calls,
            metrics.documents_retrieved,
            metrics.duration.as_millis(),
            metrics.estimated_cost
        );
        if !usage.is_empty() {
            line.push_str(&format!(" | {}", usage));
        }
        line
    }

    pub fn format_json(response: &AgentResponse) -> serde_json::Result<String> {
        serde_json::to_string_pretty(response)
    }

    /// Tool listing with parameters, in catalog order
    pub fn format_tools(tools: &[RegisteredTool]) -> String {
        let mut output = String::new();
        for entry in tools {
            output.push_str(&format!(
                "{} [{}]\n  {}\n",
                entry.metadata.name.bold(),
                entry.metadata.category,
                entry.metadata.description
            ));
            for param in &entry.definition().parameters {
                let requirement = if param.required { "required" } else { "optional" };
                output.push_str(&format!(
                    "    - {} ({}, {})\n",
                    param.name,
                    param.param_type.as_str(),
                    requirement
                ));
            }
        }
        output
    }

    /// Render a streamed event; `None` for events with nothing to show
    pub fn format_event(event: &AgentEvent) -> Option<String> {
        match event {
            AgentEvent::ReasoningStarted { iteration } => Some(format!(
                "{} {}",
                "->".cyan(),
                format!("Iteration {}", iteration).bold()
            )),
            AgentEvent::ToolCallStarted { call, cached } => Some(format!(
                "  {} {}{}",
                "*".blue(),
                describe_call(call),
                if *cached { " (cached)".dimmed().to_string() } else { String::new() }
            )),
            AgentEvent::ToolCallCompleted { call, result, .. } => {
                let preview = truncate(&single_line(&result.display_content()), PREVIEW_LEN);
                let marker = if result.is_success() {
                    "v".green()
                } else {
                    "x".red()
                };
                Some(format!("  {} {}: {}", marker, call.tool_name, preview))
            }
            // The answer is printed once the response is complete
            AgentEvent::FinalContent { .. } => None,
        }
    }
}

fn describe_call(call: &ToolCall) -> String {
    let args = serde_json::to_string(call.arguments()).unwrap_or_default();
    format!("{} {}", call.tool_name, truncate(&args, PREVIEW_LEN))
}
