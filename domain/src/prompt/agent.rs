//! Prompt templates for the orchestration loop

use crate::agent::config::AgentConfig;
use crate::session::entities::{AgentMessage, MessageBody, Role};
use crate::tool::entities::{TENANT_ARG, ToolDefinition};

/// Default behavior rules, replaced wholesale by `AgentConfig::system_prompt`
const DEFAULT_RULES: &str = r#"You are a helpful assistant that answers questions using the tools available to you.

## Guidelines

1. Use tools when the answer depends on information you do not already have
2. Prefer a single well-targeted call over many speculative ones
3. Ground factual claims in retrieved documents and mention their sources
4. When you have enough information, answer directly in plain text"#;

/// Templates for generating orchestration prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// System prompt for one iteration.
    ///
    /// The tool section and the tool-call format are always present; the
    /// configured override only replaces the behavior rules.
    pub fn system(
        definitions: &[ToolDefinition],
        config: &AgentConfig,
        tenant_id: Option<&str>,
    ) -> String {
        let rules = config.system_prompt.as_deref().unwrap_or(DEFAULT_RULES);

        let mut prompt = format!(
            r#"{rules}

## Available Tools

{tools}

## How to Use Tools

To call one or more tools, reply with a JSON object in this format:

{{
  "reasoning": "Brief explanation of why you need these tools",
  "tool_calls": [
    {{"tool_name": "tool_name", "arguments": {{"arg1": "value1"}}}}
  ]
}}

Independent calls may be listed together. When you are ready to answer,
reply in plain text without any tool_calls."#,
            rules = rules.trim_end(),
            tools = Self::tool_section(definitions),
        );

        if config.use_rag {
            prompt.push_str(&format!(
                "\n\n## Retrieval\n\nWhen searching documents, request top_k={} and ignore results scoring below {}.",
                config.rag_top_k, config.rag_min_score
            ));
            if let Some(tenant) = tenant_id {
                prompt.push_str(&format!(
                    "\nEvery retrieval and memory call must include \"{TENANT_ARG}\": \"{tenant}\" in its arguments."
                ));
            }
        }

        if config.chain_of_thought {
            prompt.push_str("\n\nThink step by step before deciding whether to call a tool or answer.");
        }

        prompt
    }

    /// Render every tool's name, description and parameters
    pub fn tool_section(definitions: &[ToolDefinition]) -> String {
        if definitions.is_empty() {
            return "(no tools available)".to_string();
        }

        definitions
            .iter()
            .map(|t| {
                let params = t
                    .parameters
                    .iter()
                    .map(|p| {
                        let required = if p.required { "required" } else { "optional" };
                        format!(
                            "    - {} ({}, {}): {}",
                            p.name, p.param_type, required, p.description
                        )
                    })
                    .collect::<Vec<_>>();

                if params.is_empty() {
                    format!("- **{}**: {}", t.name, t.description)
                } else {
                    format!(
                        "- **{}**: {}\n  Parameters:\n{}",
                        t.name,
                        t.description,
                        params.join("\n")
                    )
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render the transcript as dialogue lines.
    ///
    /// Tool-call turns are skipped; their results carry the information the
    /// model needs.
    pub fn render_context(messages: &[AgentMessage]) -> String {
        messages
            .iter()
            .filter_map(|m| match (&m.role, &m.body) {
                (Role::User, MessageBody::Content(c)) => Some(format!("User: {c}")),
                (Role::Assistant, MessageBody::Content(c)) => Some(format!("Assistant: {c}")),
                (_, MessageBody::ToolResult(r)) => {
                    Some(format!("Tool Result: {}", r.display_content()))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::entities::{ParamType, ToolCall, ToolParameter};
    use crate::tool::value_objects::{ToolError, ToolResult};

    fn search_def() -> ToolDefinition {
        ToolDefinition::new("search_documents", "Search the document index")
            .with_parameter(ToolParameter::new("query", "Search query", true))
            .with_parameter(
                ToolParameter::new("top_k", "Result count", false).with_type(ParamType::Number),
            )
    }

    #[test]
    fn test_system_lists_tools_with_parameter_details() {
        let prompt = AgentPromptTemplate::system(&[search_def()], &AgentConfig::default(), None);
        assert!(prompt.contains("**search_documents**"));
        assert!(prompt.contains("query (string, required): Search query"));
        assert!(prompt.contains("top_k (number, optional)"));
        assert!(prompt.contains("\"tool_calls\""));
    }

    #[test]
    fn test_tenant_instruction_only_with_rag_and_tenant() {
        let config = AgentConfig::default();
        let with_tenant = AgentPromptTemplate::system(&[search_def()], &config, Some("acme"));
        assert!(with_tenant.contains("\"tenant_id\": \"acme\""));

        let without_tenant = AgentPromptTemplate::system(&[search_def()], &config, None);
        assert!(!without_tenant.contains("tenant_id"));

        let no_rag = AgentPromptTemplate::system(
            &[search_def()],
            &config.clone().with_rag(false),
            Some("acme"),
        );
        assert!(!no_rag.contains("tenant_id"));
    }

    #[test]
    fn test_override_replaces_rules_but_keeps_tools() {
        let config = AgentConfig::default().with_system_prompt("You are a pirate.");
        let prompt = AgentPromptTemplate::system(&[search_def()], &config, None);
        assert!(prompt.starts_with("You are a pirate."));
        assert!(!prompt.contains("## Guidelines"));
        assert!(prompt.contains("**search_documents**"));
    }

    #[test]
    fn test_render_context_skips_tool_call_turns() {
        let messages = vec![
            AgentMessage::user("What is the refund window?"),
            AgentMessage::tool_call(ToolCall::new("search_documents")),
            AgentMessage::tool_result(ToolResult::success("search_documents", "30 days")),
            AgentMessage::tool_result(ToolResult::failure(
                "read_file",
                ToolError::not_found("a.txt"),
            )),
            AgentMessage::assistant("It is 30 days."),
        ];
        let rendered = AgentPromptTemplate::render_context(&messages);
        let lines: Vec<&str> = rendered.split("\n\n").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "User: What is the refund window?");
        assert_eq!(lines[1], "Tool Result: 30 days");
        assert!(lines[2].starts_with("Tool Result: Error: "));
        assert_eq!(lines[3], "Assistant: It is 30 days.");
    }
}
