//! Raw TOML configuration data types
//!
//! These structs mirror the config file layout. `[agent]` deserializes
//! straight into the domain [`AgentConfig`].

use super::loader::ConfigError;
use crate::tools::BUILTIN_TOOLS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use toolweave_domain::AgentConfig;

/// Complete file configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Orchestration loop settings
    pub agent: AgentConfig,
    /// Chat model endpoint
    pub provider: FileProviderConfig,
    /// Builtin tool wiring
    pub tools: FileToolsConfig,
}

/// `[provider]` section: an OpenAI-compatible chat endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            temperature: None,
        }
    }
}

impl FileProviderConfig {
    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// `[tools]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolsConfig {
    /// Directory filesystem tools are confined to (default: current dir)
    pub root: Option<PathBuf>,
    /// Directory of `.txt`/`.md` files loaded into the document index
    pub docs_dir: Option<PathBuf>,
    /// Tenant owning the documents in `docs_dir` (None = global)
    pub docs_tenant: Option<String>,
    /// Builtin tools to register (None = all)
    pub enabled: Option<Vec<String>>,
    /// Per-call time limit in seconds
    pub call_timeout_secs: Option<u64>,
}

impl FileToolsConfig {
    pub fn call_timeout(&self) -> Option<Duration> {
        self.call_timeout_secs.map(Duration::from_secs)
    }
}

impl FileConfig {
    /// Reject values the loop or the gateway cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let score = self.agent.rag_min_score;
        if !(0.0..=1.0).contains(&score) {
            return Err(ConfigError::invalid(
                "agent.rag_min_score",
                format!("must be between 0 and 1, got {}", score),
            ));
        }
        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::invalid("provider.model", "must not be empty"));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::invalid("provider.timeout_secs", "must be positive"));
        }
        if self.tools.call_timeout_secs == Some(0) {
            return Err(ConfigError::invalid("tools.call_timeout_secs", "must be positive"));
        }
        if let Some(enabled) = &self.tools.enabled
            && let Some(unknown) = enabled
                .iter()
                .find(|name| !BUILTIN_TOOLS.contains(&name.as_str()))
        {
            return Err(ConfigError::invalid(
                "tools.enabled",
                format!(
                    "unknown tool '{}' (available: {})",
                    unknown,
                    BUILTIN_TOOLS.join(", ")
                ),
            ));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Render(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[agent]
max_tool_calls = 3
parallel_tools = false
rag_min_score = 0.25

[provider]
base_url = "http://localhost:11434/v1"
model = "llama3.1"
temperature = 0.1

[tools]
docs_dir = "docs"
docs_tenant = "acme"
enabled = ["search_documents", "read_file"]
call_timeout_secs = 10
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.agent.max_tool_calls, 3);
        assert!(!config.agent.parallel_tools);
        // Unset agent fields keep their defaults
        assert!(config.agent.use_rag);
        assert_eq!(config.provider.model, "llama3.1");
        assert_eq!(config.provider.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.tools.docs_dir, Some(PathBuf::from("docs")));
        assert_eq!(config.tools.call_timeout(), Some(Duration::from_secs(10)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent, AgentConfig::default());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = FileConfig::default();
        config.agent.rag_min_score = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("agent.rag_min_score"));

        let mut config = FileConfig::default();
        config.tools.enabled = Some(vec!["run_command".to_string()]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("run_command"));

        let mut config = FileConfig::default();
        config.provider.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_to_toml_round_trips_through_parser() {
        let mut config = FileConfig::default();
        config.agent.max_tool_calls = 7;
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[agent]"));
        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
