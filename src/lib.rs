// src/lib.rs
//! Developer-Options Override Engine
//!
//! An in-process layer that intercepts the runtime's configuration readers
//! (system properties and the developer settings) for one target process,
//! answers a configurable set of keys with fixed values, and passes every
//! other query through to the genuine implementation untouched.
//!
//! # Architecture
//!
//! The engine is structured into several key modules:
//!
//! - **runtime**: Scope guard and activation state machine
//! - **preferences**: One-shot load of the toggle document
//! - **rules**: Compiled-in override catalog and the active rule table
//! - **interception**: Host boundary, installation, and query interceptors
//! - **observability**: Tracing and metrics setup
//! - **utils**: Engine configuration and errors
//!
//! # Usage
//!
//! The host calls into the engine once, on the process-preparation thread:
//!
//! ```no_run
//! use devopt_override_engine::interception::MemoryRuntime;
//! use devopt_override_engine::{ActivationOutcome, EngineConfig, OverrideModule};
//!
//! let mut host = MemoryRuntime::new("com.tosan.dara.sepah")
//!     .with_preferences(r#"{"adb_enabled": true}"#);
//! let mut module = OverrideModule::new(EngineConfig::default());
//!
//! if let ActivationOutcome::Installed(report) = module.activate(&mut host) {
//!     println!("{} accessors intercepted", report.installed.len());
//! }
//! ```

// Public module exports
pub mod interception;
pub mod observability;
pub mod preferences;
pub mod rules;
pub mod runtime;
pub mod utils;

// Re-export commonly used types
pub use interception::{Accessor, AccessorCall, AccessorSignature, AccessorValue, HookHost};
pub use preferences::{ConfigSource, ConfigurationSnapshot};
pub use rules::{ActiveRuleTable, OverrideRule};
pub use runtime::{ActivationOutcome, ModuleState, OverrideModule};
pub use utils::config::EngineConfig;
pub use utils::errors::{EngineError, Result};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Engine build information
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub build_timestamp: &'static str,
    pub rustc_version: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: VERSION,
            git_hash: GIT_HASH,
            build_timestamp: env!("BUILD_TIMESTAMP"),
            rustc_version: env!("RUSTC_VERSION"),
        }
    }
}
