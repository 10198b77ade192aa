// src/utils/config.rs
//! Engine configuration
//!
//! Settings are layered the usual way:
//!
//! 1. Compiled defaults ([`EngineConfig::default`])
//! 2. Optional `module.toml` in the module directory
//! 3. Environment variables prefixed with `OVERRIDE_` (nested keys use `__`)
//!
//! These settings shape how the engine behaves. They are distinct from the
//! preferences document, which only toggles individual override rules.

use crate::utils::errors::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Process the overrides are built for
pub const DEFAULT_TARGET_PROCESS: &str = "com.tosan.dara.sepah";

/// Preferences document name inside the module directory
pub const DEFAULT_PREFERENCES_FILE: &str = "config.json";

/// Engine settings file name inside the module directory
pub const SETTINGS_FILE: &str = "module.toml";

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "OVERRIDE";

/// What to do when the preferences document cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingConfigPolicy {
    /// Abort activation, install nothing
    FailClosed,

    /// Activate with every rule enabled
    FailOpen,
}

impl Default for MissingConfigPolicy {
    fn default() -> Self {
        MissingConfigPolicy::FailClosed
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive (overridden by `RUST_LOG`)
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Exact process identity that activates the overrides
    pub target_process: String,

    /// Preferences document name inside the module directory
    pub preferences_file: String,

    /// Behaviour when the preferences document is missing or unreadable
    pub missing_config_policy: MissingConfigPolicy,

    /// Whether a preference key absent from a present document is active
    pub absent_key_default: bool,

    /// Upper bound on the preferences document size in bytes
    pub max_config_bytes: u64,

    /// Install accessor families even when none of their rules is active
    pub install_idle_families: bool,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_process: DEFAULT_TARGET_PROCESS.to_string(),
            preferences_file: DEFAULT_PREFERENCES_FILE.to_string(),
            missing_config_policy: MissingConfigPolicy::FailClosed,
            absent_key_default: true,
            max_config_bytes: 64 * 1024,
            install_idle_families: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load settings with defaults and environment overrides only
    pub fn load() -> Result<Self> {
        Self::build(None)
    }

    /// Load settings, layering `module.toml` from the module directory
    pub fn load_from_dir(module_dir: &Path) -> Result<Self> {
        Self::build(Some(module_dir))
    }

    fn build(module_dir: Option<&Path>) -> Result<Self> {
        Self::build_with_env(module_dir, None)
    }

    /// `env` replaces the process environment when given
    fn build_with_env(
        module_dir: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&EngineConfig::default())?);

        if let Some(dir) = module_dir {
            builder = builder.add_source(config::File::from(dir.join(SETTINGS_FILE)).required(false));
        }

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: EngineConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.target_process.trim().is_empty() {
            return Err(EngineError::ConfigError(
                "target_process cannot be empty".to_string(),
            ));
        }

        if self.preferences_file.trim().is_empty() {
            return Err(EngineError::ConfigError(
                "preferences_file cannot be empty".to_string(),
            ));
        }

        if self.max_config_bytes == 0 {
            return Err(EngineError::ConfigError(
                "max_config_bytes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
