//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for toolweave
#[derive(Parser, Debug)]
#[command(name = "toolweave")]
#[command(author, version, about = "Tool-calling orchestration for LLM agents")]
#[command(long_about = r#"
toolweave answers a message by letting a chat model call tools (document
search, file reads, code search, memory) until it produces a final answer or
runs out of tool-call iterations.

Configuration files are loaded from (in priority order):
1. TOOLWEAVE_* environment variables (TOOLWEAVE_AGENT__MAX_TOOL_CALLS=3)
2. --config <path>                      Explicit config file
3. ./toolweave.toml                     Project-level config
4. ~/.config/toolweave/config.toml      Global config

Example:
  toolweave "How long do refunds take?" --docs ./policies --tenant acme
  toolweave --stream --max-tool-calls 3 "Where is the retry logic defined?"
  toolweave --list-tools
"#)]
pub struct Cli {
    /// The user message to answer
    pub message: Option<String>,

    /// Print each step as it happens
    #[arg(long)]
    pub stream: bool,

    /// Maximum reasoning iterations that may call tools
    #[arg(long, value_name = "N")]
    pub max_tool_calls: Option<usize>,

    /// Run the calls of one iteration one after another
    #[arg(long)]
    pub sequential: bool,

    /// Disable retrieval instructions in the system prompt
    #[arg(long)]
    pub no_rag: bool,

    /// Tenant scope for retrieval and memory calls
    #[arg(long, value_name = "ID")]
    pub tenant: Option<String>,

    /// Directory of .txt/.md documents to index
    #[arg(long, value_name = "DIR")]
    pub docs: Option<PathBuf>,

    /// Workspace root for filesystem tools
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,

    /// List the registered tools and exit
    #[arg(long)]
    pub list_tools: bool,

    /// Append the transcript to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print the response as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "toolweave",
            "How long do refunds take?",
            "--stream",
            "--max-tool-calls",
            "3",
            "--sequential",
            "--tenant",
            "acme",
            "--docs",
            "policies",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.message.as_deref(), Some("How long do refunds take?"));
        assert!(cli.stream);
        assert_eq!(cli.max_tool_calls, Some(3));
        assert!(cli.sequential);
        assert!(!cli.no_rag);
        assert_eq!(cli.tenant.as_deref(), Some("acme"));
        assert_eq!(cli.docs, Some(PathBuf::from("policies")));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_message_is_optional() {
        let cli = Cli::try_parse_from(["toolweave", "--list-tools"]).unwrap();
        assert!(cli.message.is_none());
        assert!(cli.list_tools);
    }

    #[test]
    fn test_rejects_non_numeric_budget() {
        assert!(Cli::try_parse_from(["toolweave", "hi", "--max-tool-calls", "many"]).is_err());
    }
}
