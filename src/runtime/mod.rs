// src/runtime/mod.rs
//! Module lifecycle
//!
//! This module decides whether, and drives how, the overrides come alive in
//! a process:
//!
//! - **Scope Guard**: one exact-match decision on the process identity
//! - **Override Module**: the activation state machine (scope check,
//!   preferences load, interceptor installation)
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────── activation window (single thread) ─────────────────┐
//! │  identity ─► ScopeGuard ─► ConfigLoader ─► ActiveRuleTable          │
//! │                                                  │                  │
//! │                              InterceptionManager ─► host.hook() x N │
//! │                                                  │                  │
//! │                                         BindingRegistry (frozen)    │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!              application threads ─► QueryInterceptor (read-only)
//! ```

pub mod module;
pub mod scope_guard;

// Re-export commonly used types
pub use module::{ActivationOutcome, ModuleState, OverrideModule};
pub use scope_guard::ScopeGuard;
