// src/preferences/snapshot.rs
//! Frozen preference flags

use std::collections::HashMap;

/// Immutable preference-key → flag map
///
/// Built once during activation and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSnapshot {
    flags: HashMap<String, bool>,
    absent_default: bool,
}

impl ConfigurationSnapshot {
    pub fn new(flags: HashMap<String, bool>, absent_default: bool) -> Self {
        Self {
            flags,
            absent_default,
        }
    }

    /// Snapshot used by the fail-open policy: every rule is active
    pub fn all_active() -> Self {
        Self::new(HashMap::new(), true)
    }

    /// Whether the rule gated by `preference_key` is active
    pub fn is_active(&self, preference_key: &str) -> bool {
        self.flags
            .get(preference_key)
            .copied()
            .unwrap_or(self.absent_default)
    }

    /// Explicit value from the document, if present
    pub fn get(&self, preference_key: &str) -> Option<bool> {
        self.flags.get(preference_key).copied()
    }

    pub fn absent_default(&self) -> bool {
        self.absent_default
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
