// src/runtime/scope_guard.rs
//! Target scope guard
//!
//! Activation is restricted to one process identity, matched exactly. The
//! first decision is kept for the life of the process.

use once_cell::sync::OnceCell;
use tracing::debug;

/// Decides whether this process is the override target
#[derive(Debug)]
pub struct ScopeGuard {
    target: String,
    decision: OnceCell<bool>,
}

impl ScopeGuard {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            decision: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Exact match; a missing or empty identity is never in scope
    pub fn is_in_scope(&self, identity: Option<&str>) -> bool {
        match identity {
            Some(identity) if !identity.is_empty() => identity == self.target,
            _ => false,
        }
    }

    /// One-shot decision: later calls return the first answer
    pub fn decide(&self, identity: Option<&str>) -> bool {
        *self.decision.get_or_init(|| {
            let in_scope = self.is_in_scope(identity);
            debug!(
                "Process {:?} {} target scope",
                identity,
                if in_scope { "is in" } else { "is outside" }
            );
            in_scope
        })
    }

    /// Decision already taken, if any
    pub fn decision(&self) -> Option<bool> {
        self.decision.get().copied()
    }
}
