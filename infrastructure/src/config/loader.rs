//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Project-level config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = "toolweave.toml";

/// Prefix for environment overrides (`TOOLWEAVE_AGENT__MAX_TOOL_CALLS=3`)
pub const ENV_PREFIX: &str = "TOOLWEAVE_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },

    #[error("Failed to render configuration: {0}")]
    Render(String),
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Configuration loader that handles file discovery and merging
///
/// Sources, lowest to highest priority:
/// 1. Built-in defaults
/// 2. Global: `$XDG_CONFIG_HOME/toolweave/config.toml`
/// 3. Project: `./toolweave.toml`
/// 4. Explicit `--config <path>`
/// 5. `TOOLWEAVE_`-prefixed environment variables (`__` separates sections)
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    global_path: Option<PathBuf>,
    project_path: PathBuf,
    explicit_path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            global_path: Self::global_config_path(),
            project_path: PathBuf::from(PROJECT_CONFIG_FILE),
            explicit_path: None,
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_explicit_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.explicit_path = path.map(Into::into);
        self
    }

    pub fn with_global_path(mut self, path: Option<impl Into<PathBuf>>) -> Self {
        self.global_path = path.map(Into::into);
        self
    }

    pub fn with_project_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.project_path = path.into();
        self
    }

    /// Merge all sources, extract and validate
    pub fn load(&self) -> Result<FileConfig, ConfigError> {
        let config: FileConfig = self.figment()?.extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    fn figment(&self) -> Result<Figment, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global) = &self.global_path
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }

        if self.project_path.exists() {
            figment = figment.merge(Toml::file(&self.project_path));
        }

        if let Some(path) = &self.explicit_path {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Get the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("toolweave").join("config.toml"))
    }

    /// Config files that exist and will be merged, lowest priority first
    pub fn active_sources(&self) -> Vec<&Path> {
        let mut sources = Vec::new();
        if let Some(global) = &self.global_path
            && global.exists()
        {
            sources.push(global.as_path());
        }
        if self.project_path.exists() {
            sources.push(self.project_path.as_path());
        }
        if let Some(path) = &self.explicit_path
            && path.exists()
        {
            sources.push(path.as_path());
        }
        sources
    }
}
