// src/utils/mod.rs
//! Shared configuration and error types

pub mod config;
pub mod errors;

pub use config::{EngineConfig, LoggingConfig, MissingConfigPolicy};
pub use errors::{EngineError, Result};
