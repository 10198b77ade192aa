// src/interception/manager.rs
//! Interception manager
//!
//! Installs one [`QueryInterceptor`] per accessor signature and keeps the
//! genuine implementation the host hands back.
//!
//! # Lifecycle
//!
//! ```text
//! interceptor_for(sig) ──► pending binding (empty)
//!        │
//! install(sig) ──► host.hook() ──► original ──► binding.publish(original)
//!        │
//! into_registry() ──► BindingRegistry (frozen, shared read-only)
//! ```
//!
//! All of this runs on the single activation thread. A binding is published
//! exactly once; afterwards it is only read.

use crate::interception::accessor::Accessor;
use crate::interception::host::HookHost;
use crate::interception::query_interceptor::QueryInterceptor;
use crate::interception::signature::{AccessorFamily, AccessorSignature};
use crate::observability::names;
use crate::rules::active::ActiveRuleTable;
use crate::utils::errors::{EngineError, Result};
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Captured original for one signature
pub struct InterceptionBinding {
    signature: AccessorSignature,
    original: OnceCell<Arc<dyn Accessor>>,
}

impl InterceptionBinding {
    pub fn new(signature: AccessorSignature) -> Self {
        Self {
            signature,
            original: OnceCell::new(),
        }
    }

    pub fn signature(&self) -> AccessorSignature {
        self.signature
    }

    /// Store the genuine implementation; a second publish is rejected
    pub fn publish(&self, original: Arc<dyn Accessor>) -> Result<()> {
        self.original
            .set(original)
            .map_err(|_| EngineError::AlreadyInstalled(self.signature.to_string()))
    }

    pub fn original(&self) -> Option<&Arc<dyn Accessor>> {
        self.original.get()
    }

    pub fn is_published(&self) -> bool {
        self.original.get().is_some()
    }
}

impl fmt::Debug for InterceptionBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionBinding")
            .field("signature", &self.signature)
            .field("published", &self.is_published())
            .finish()
    }
}

/// One signature the host refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallFailure {
    pub signature: AccessorSignature,
    pub reason: String,
}

/// Outcome of [`InterceptionManager::install_all`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Signatures now routed through an interceptor
    pub installed: Vec<AccessorSignature>,

    /// Signatures the host refused
    pub failed: Vec<InstallFailure>,

    /// Signatures left alone because their family has no active rule
    pub skipped: Vec<AccessorSignature>,

    /// Families for which every attempted signature failed
    pub failed_families: Vec<AccessorFamily>,
}

impl InstallReport {
    /// Nothing was hooked
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }

    pub fn is_installed(&self, signature: AccessorSignature) -> bool {
        self.installed.contains(&signature)
    }
}

/// Frozen signature → binding registry
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: BTreeMap<AccessorSignature, Arc<InterceptionBinding>>,
}

impl BindingRegistry {
    pub fn get(&self, signature: AccessorSignature) -> Option<&Arc<InterceptionBinding>> {
        self.bindings.get(&signature)
    }

    /// Genuine implementation captured for `signature`
    pub fn original(&self, signature: AccessorSignature) -> Option<Arc<dyn Accessor>> {
        self.bindings
            .get(&signature)
            .and_then(|binding| binding.original().cloned())
    }

    pub fn signatures(&self) -> impl Iterator<Item = AccessorSignature> + '_ {
        self.bindings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Interception manager
pub struct InterceptionManager {
    rules: Arc<ActiveRuleTable>,
    install_idle_families: bool,
    pending: BTreeMap<AccessorSignature, Arc<InterceptionBinding>>,
    bindings: BTreeMap<AccessorSignature, Arc<InterceptionBinding>>,
}

impl InterceptionManager {
    pub fn new(rules: Arc<ActiveRuleTable>, install_idle_families: bool) -> Self {
        Self {
            rules,
            install_idle_families,
            pending: BTreeMap::new(),
            bindings: BTreeMap::new(),
        }
    }

    /// Build the interceptor for `signature`, wired to its (empty) binding
    pub fn interceptor_for(&mut self, signature: AccessorSignature) -> QueryInterceptor {
        let binding = self
            .pending
            .entry(signature)
            .or_insert_with(|| Arc::new(InterceptionBinding::new(signature)))
            .clone();

        QueryInterceptor::new(signature, self.rules.clone(), binding)
    }

    /// Swap `handler` in for `signature` and capture the original
    ///
    /// Installing the same signature twice is refused.
    pub fn install(
        &mut self,
        host: &mut dyn HookHost,
        signature: AccessorSignature,
        handler: Arc<dyn Accessor>,
    ) -> Result<Arc<dyn Accessor>> {
        if self.bindings.contains_key(&signature) {
            error!("Refusing to install {} twice", signature);
            return Err(EngineError::AlreadyInstalled(signature.to_string()));
        }

        let original = host
            .hook(signature, handler)
            .map_err(|source| EngineError::InstallationFailed {
                signature: signature.to_string(),
                source,
            })?;

        let binding = self
            .pending
            .remove(&signature)
            .unwrap_or_else(|| Arc::new(InterceptionBinding::new(signature)));
        binding.publish(original.clone())?;
        self.bindings.insert(signature, binding);

        debug!("Installed {}", signature);
        Ok(original)
    }

    /// Install every known signature
    ///
    /// Failures are per signature: the rest still get installed.
    pub fn install_all(&mut self, host: &mut dyn HookHost) -> Result<InstallReport> {
        if !self.bindings.is_empty() {
            error!("install_all called on a manager that already installed hooks");
            return Err(EngineError::InvalidState(
                "interceptors already installed".to_string(),
            ));
        }

        let mut report = InstallReport::default();
        let mut attempts: BTreeMap<AccessorFamily, (usize, usize)> = BTreeMap::new();

        for signature in AccessorSignature::all() {
            let family = signature.family();

            if !self.install_idle_families && !self.rules.has_family(family) {
                debug!("Skipping {}: no active rule for {}", signature, family);
                report.skipped.push(signature);
                continue;
            }

            let handler: Arc<dyn Accessor> = Arc::new(self.interceptor_for(signature));
            let counts = attempts.entry(family).or_insert((0, 0));
            counts.0 += 1;

            match self.install(host, signature, handler) {
                Ok(_) => {
                    counts.1 += 1;
                    report.installed.push(signature);
                }
                Err(err) => {
                    warn!("{}", err);
                    self.pending.remove(&signature);
                    report.failed.push(InstallFailure {
                        signature,
                        reason: err.to_string(),
                    });
                }
            }
        }

        for (family, (attempted, installed)) in attempts {
            if attempted > 0 && installed == 0 {
                error!("Every {} accessor failed to install", family);
                report.failed_families.push(family);
            }
        }

        metrics::counter!(names::HOOKS_INSTALLED).increment(report.installed.len() as u64);
        metrics::counter!(names::HOOKS_FAILED).increment(report.failed.len() as u64);
        metrics::counter!(names::HOOKS_SKIPPED).increment(report.skipped.len() as u64);

        info!(
            "Installed {} accessors ({} failed, {} skipped)",
            report.installed.len(),
            report.failed.len(),
            report.skipped.len()
        );

        Ok(report)
    }

    /// Freeze the captured originals
    pub fn into_registry(self) -> BindingRegistry {
        BindingRegistry {
            bindings: self.bindings,
        }
    }
}
