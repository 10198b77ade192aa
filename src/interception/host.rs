// src/interception/host.rs
//! Host boundary
//!
//! The injection framework that loads us owns process discovery, file
//! delivery and the actual method swapping. We only see it through
//! [`HookHost`].

use crate::interception::accessor::Accessor;
use crate::interception::signature::AccessorSignature;
use crate::preferences::loader::ConfigSource;
use std::sync::Arc;
use thiserror::Error;

/// Why the host refused to swap a method
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    /// Class or method does not exist in this runtime
    #[error("accessor {class}.{method} not found")]
    AccessorNotFound { class: String, method: String },

    /// Method exists but with a different type descriptor
    #[error("signature mismatch for {method}: runtime has {actual}")]
    SignatureMismatch { method: String, actual: String },

    /// Any other host-side refusal
    #[error("host rejected hook: {0}")]
    Rejected(String),
}

/// Services the host provides during the activation window
pub trait HookHost {
    /// Identity of the process being prepared, if the host can obtain it
    fn process_identity(&self) -> Option<String>;

    /// Handle to the preferences blob in the module's private storage
    fn config_source(&self) -> &dyn ConfigSource;

    /// Swap `replacement` in for `signature` and hand back the genuine
    /// implementation that was active before
    fn hook(
        &mut self,
        signature: AccessorSignature,
        replacement: Arc<dyn Accessor>,
    ) -> Result<Arc<dyn Accessor>, HookError>;

    /// Tell the host our code is not needed in this process
    fn allow_unload(&mut self) {}
}
