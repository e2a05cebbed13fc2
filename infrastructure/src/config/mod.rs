//! Configuration file loading for toolweave
//!
//! The priority order (highest to lowest):
//!
//! 1. `TOOLWEAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./toolweave.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/toolweave/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileProviderConfig, FileToolsConfig};
pub use loader::{ConfigError, ConfigLoader, ENV_PREFIX, PROJECT_CONFIG_FILE};
