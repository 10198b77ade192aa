// src/preferences/mod.rs
//! Preference flags
//!
//! - **Loader**: one bounded read of the toggle document
//! - **Snapshot**: the frozen key → flag map consulted by the rule table

pub mod loader;
pub mod snapshot;

pub use loader::{ConfigLoader, ConfigSource, LoadError, ModuleDirSource};
pub use snapshot::ConfigurationSnapshot;
