// src/observability/mod.rs
//! Logging and metrics setup
//!
//! The engine runs inside somebody else's process, so initialization never
//! fails hard: if a global subscriber is already installed we keep it.

use crate::utils::config::LoggingConfig;
use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<bool> = OnceCell::new();

/// Metric names recorded during activation
pub mod names {
    pub const ACTIVATIONS: &str = "override_activations_total";
    pub const HOOKS_INSTALLED: &str = "override_hooks_installed_total";
    pub const HOOKS_FAILED: &str = "override_hooks_failed_total";
    pub const HOOKS_SKIPPED: &str = "override_hooks_skipped_total";
    pub const ACTIVE_RULES: &str = "override_active_rules";
}

/// Initialize tracing
///
/// Returns whether the global subscriber was installed by this crate. Only
/// the first call does any work; later calls report the cached result.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    *TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true);

        if config.json {
            builder.json().try_init().is_ok()
        } else {
            builder.try_init().is_ok()
        }
    })
}

/// Record the terminal outcome of an activation attempt
pub fn record_activation(outcome: &'static str) {
    metrics::counter!(names::ACTIVATIONS, "outcome" => outcome).increment(1);
}
