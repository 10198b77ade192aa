// src/utils/errors.rs
//! Engine error types
//!
//! Every failure the activation sequence can hit maps onto one
//! [`EngineError`] variant. The per-call read path never produces one:
//! interceptors always hand the caller a value.

use crate::interception::host::HookError;
use crate::preferences::loader::LoadError;
use thiserror::Error;

/// Result alias used across the engine
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine errors
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Current process is not the target; activation is skipped
    #[error("process identity {0:?} is outside the target scope")]
    ScopeMismatch(Option<String>),

    /// Preferences resource could not be read
    #[error("preferences not found: {0}")]
    ConfigNotFound(String),

    /// Preferences resource could not be parsed
    #[error("preferences malformed: {0}")]
    ConfigMalformed(String),

    /// Host refused to install one accessor signature
    #[error("installation failed for {signature}: {source}")]
    InstallationFailed {
        signature: String,
        #[source]
        source: HookError,
    },

    /// Same accessor signature installed twice
    #[error("accessor {0} is already installed")]
    AlreadyInstalled(String),

    /// Substitute value has no numeric projection
    #[error("cannot parse {value:?} as {kind}")]
    ValueParseFailed { value: String, kind: &'static str },

    /// Lifecycle operation called out of order
    #[error("invalid module state: {0}")]
    InvalidState(String),

    /// Engine settings could not be loaded or validated
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl From<LoadError> for EngineError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(reason) => EngineError::ConfigNotFound(reason),
            LoadError::Malformed(reason) => EngineError::ConfigMalformed(reason),
        }
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::ConfigError(err.to_string())
    }
}

impl EngineError {
    /// Whether this error ends activation for the process
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            EngineError::InstallationFailed { .. } | EngineError::ValueParseFailed { .. }
        )
    }
}
