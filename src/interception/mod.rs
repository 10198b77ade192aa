// src/interception/mod.rs
//! Accessor interception layer
//!
//! This module swaps the runtime's configuration readers for interceptors:
//!
//! - **Accessor**: call/value model shared by originals and interceptors
//! - **Signature**: the concrete methods we know how to intercept
//! - **Host**: the boundary to the injection framework
//! - **Manager**: installation and capture of original implementations
//! - **Query Interceptor**: the per-call rule lookup and fallback
//! - **Memory Host**: in-process reference runtime
//!
//! # Architecture
//!
//! ```text
//! Application Code (Unmodified)
//!     │
//!     ├─ SystemProperties.get*(key[, def]) ──┐
//!     ├─ Settings$Global.get*(cr, key, ..) ──┼─► QueryInterceptor
//!     └─ Settings$Secure.get*(cr, key, ..) ──┘        │
//!                                              rule hit? ──► substitute
//!                                                     │
//!                                                     └──► captured original
//! ```

pub mod accessor;
pub mod host;
pub mod manager;
pub mod memory_host;
pub mod query_interceptor;
pub mod signature;

// Re-export commonly used types
pub use accessor::{Accessor, AccessorCall, AccessorValue, ContextHandle, ValueKind};
pub use host::{HookError, HookHost};
pub use manager::{BindingRegistry, InstallFailure, InstallReport, InterceptionBinding, InterceptionManager};
pub use memory_host::MemoryRuntime;
pub use query_interceptor::QueryInterceptor;
pub use signature::{AccessorFamily, AccessorSignature, PropertyReader, SettingReader, SettingsNamespace};
