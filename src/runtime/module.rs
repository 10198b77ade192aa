// src/runtime/module.rs
//! Override module lifecycle
//!
//! Drives one process through the activation window:
//!
//! ```text
//! Unchecked ─┬─► OutOfScope                         (terminal)
//!            └─► InScope ─► ConfigLoading ─┬─► ConfigFailed   (terminal)
//!                                          └─► ConfigLoaded ─► Installing ─► Installed (terminal)
//! ```
//!
//! Every step must run on the host's single preparation thread. Once
//! `Installed`, the module holds only frozen data and never changes state.

use crate::interception::host::HookHost;
use crate::interception::manager::{BindingRegistry, InstallReport, InterceptionManager};
use crate::observability::{self, names};
use crate::preferences::loader::{ConfigLoader, ConfigSource, LoadError};
use crate::preferences::snapshot::ConfigurationSnapshot;
use crate::rules::active::ActiveRuleTable;
use crate::runtime::scope_guard::ScopeGuard;
use crate::utils::config::{EngineConfig, MissingConfigPolicy};
use crate::utils::errors::{EngineError, Result};
use crate::BuildInfo;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Activation state of the module for this process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Unchecked,
    OutOfScope,
    InScope,
    ConfigLoading,
    ConfigFailed,
    ConfigLoaded,
    Installing,
    Installed,
}

impl ModuleState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ModuleState::OutOfScope | ModuleState::ConfigFailed | ModuleState::Installed
        )
    }
}

/// Result of a full activation run
#[derive(Debug)]
pub enum ActivationOutcome {
    /// Not the target process; nothing was touched
    OutOfScope,

    /// Preferences unusable; nothing was hooked
    ConfigFailed(EngineError),

    /// Interceptors installed (possibly partially)
    Installed(InstallReport),
}

/// Override module
pub struct OverrideModule {
    config: EngineConfig,
    guard: ScopeGuard,
    state: ModuleState,
    identity: Option<String>,
    snapshot: Option<Arc<ConfigurationSnapshot>>,
    rules: Option<Arc<ActiveRuleTable>>,
    registry: Option<Arc<BindingRegistry>>,
    report: Option<InstallReport>,
    failure: Option<EngineError>,
}

impl OverrideModule {
    /// Create a module with the given settings
    pub fn new(config: EngineConfig) -> Self {
        let guard = ScopeGuard::new(config.target_process.clone());
        Self {
            config,
            guard,
            state: ModuleState::Unchecked,
            identity: None,
            snapshot: None,
            rules: None,
            registry: None,
            report: None,
            failure: None,
        }
    }

    /// Load settings from the module directory, set up logging, and create
    /// the module
    pub fn bootstrap(module_dir: &Path) -> Result<Self> {
        let config = EngineConfig::load_from_dir(module_dir)?;
        observability::init_tracing(&config.logging);

        let build = BuildInfo::current();
        info!(
            "Override engine v{} ({}) loaded, target {}",
            build.version, build.git_hash, config.target_process
        );

        Ok(Self::new(config))
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Option<&ConfigurationSnapshot> {
        self.snapshot.as_deref()
    }

    pub fn rules(&self) -> Option<&Arc<ActiveRuleTable>> {
        self.rules.as_ref()
    }

    pub fn registry(&self) -> Option<&Arc<BindingRegistry>> {
        self.registry.as_ref()
    }

    pub fn report(&self) -> Option<&InstallReport> {
        self.report.as_ref()
    }

    /// Decide whether this process is the target
    ///
    /// The first call decides; repeated calls return the same answer.
    pub fn check_scope(&mut self, identity: Option<&str>) -> bool {
        let in_scope = self.guard.decide(identity);

        if self.state == ModuleState::Unchecked {
            self.identity = identity.map(str::to_string);
            self.state = if in_scope {
                info!("Activating for {}", self.guard.target());
                ModuleState::InScope
            } else {
                ModuleState::OutOfScope
            };
        }

        in_scope
    }

    /// Read the preferences snapshot
    ///
    /// A missing document follows `missing_config_policy`; a malformed one
    /// always ends activation.
    pub fn load_configuration(&mut self, source: &dyn ConfigSource) -> Result<&ConfigurationSnapshot> {
        self.expect_state(ModuleState::InScope, "load configuration")?;
        self.state = ModuleState::ConfigLoading;

        let loader = ConfigLoader::new(self.config.max_config_bytes, self.config.absent_key_default);
        let snapshot = match loader.load(source) {
            Ok(snapshot) => snapshot,
            Err(LoadError::NotFound(reason))
                if self.config.missing_config_policy == MissingConfigPolicy::FailOpen =>
            {
                warn!("Preferences not found ({}), enabling every rule", reason);
                ConfigurationSnapshot::all_active()
            }
            Err(err) => {
                let err = EngineError::from(err);
                error!("Deactivating: {}", err);
                self.state = ModuleState::ConfigFailed;
                self.failure = Some(err.clone());
                return Err(err);
            }
        };

        let rules = ActiveRuleTable::from_snapshot(&snapshot);
        metrics::gauge!(names::ACTIVE_RULES).set(rules.len() as f64);
        info!("{} override rules active", rules.len());

        self.rules = Some(Arc::new(rules));
        self.state = ModuleState::ConfigLoaded;
        let snapshot = self.snapshot.insert(Arc::new(snapshot));
        Ok(&**snapshot)
    }

    /// Install every interceptor and freeze the captured originals
    pub fn install_all(&mut self, host: &mut dyn HookHost) -> Result<&InstallReport> {
        self.expect_state(ModuleState::ConfigLoaded, "install interceptors")?;
        self.state = ModuleState::Installing;

        let rules = self
            .rules
            .clone()
            .ok_or_else(|| EngineError::InvalidState("rule table missing".to_string()))?;

        let mut manager = InterceptionManager::new(rules, self.config.install_idle_families);
        let report = manager.install_all(host)?;

        if report.is_empty() && !report.failed.is_empty() {
            error!("No accessor could be intercepted; running unmodified");
        }

        self.registry = Some(Arc::new(manager.into_registry()));
        self.state = ModuleState::Installed;
        let report = self.report.insert(report);
        Ok(&*report)
    }

    /// Run the whole activation sequence against `host`
    ///
    /// Steps already taken are not repeated. Once the module is terminal,
    /// further calls return the recorded outcome without touching the host.
    pub fn activate(&mut self, host: &mut dyn HookHost) -> ActivationOutcome {
        if self.state == ModuleState::Unchecked {
            let identity = host.process_identity();
            if !self.check_scope(identity.as_deref()) {
                host.allow_unload();
                observability::record_activation("out_of_scope");
                return ActivationOutcome::OutOfScope;
            }
        }

        if self.state == ModuleState::InScope {
            if let Err(err) = self.load_configuration(host.config_source()) {
                host.allow_unload();
                observability::record_activation("config_failed");
                return ActivationOutcome::ConfigFailed(err);
            }
        }

        if self.state == ModuleState::ConfigLoaded {
            return match self.install_all(host) {
                Ok(report) => {
                    observability::record_activation("installed");
                    ActivationOutcome::Installed(report.clone())
                }
                Err(err) => {
                    // Only reachable through a lifecycle bug; nothing was hooked
                    error!("Installation aborted: {}", err);
                    ActivationOutcome::ConfigFailed(err)
                }
            };
        }

        self.recorded_outcome()
    }

    fn recorded_outcome(&self) -> ActivationOutcome {
        match (self.state, &self.report, &self.failure) {
            (ModuleState::Installed, Some(report), _) => ActivationOutcome::Installed(report.clone()),
            (ModuleState::ConfigFailed, _, Some(err)) => ActivationOutcome::ConfigFailed(err.clone()),
            (ModuleState::OutOfScope, _, _) => ActivationOutcome::OutOfScope,
            (state, _, _) => ActivationOutcome::ConfigFailed(EngineError::InvalidState(format!(
                "activation interrupted in state {:?}",
                state
            ))),
        }
    }

    fn expect_state(&self, expected: ModuleState, action: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else if self.state == ModuleState::OutOfScope {
            Err(EngineError::ScopeMismatch(self.identity.clone()))
        } else {
            Err(EngineError::InvalidState(format!(
                "cannot {} in state {:?}",
                action, self.state
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::accessor::{AccessorCall, AccessorValue, ContextHandle};
    use crate::interception::memory_host::MemoryRuntime;
    use crate::interception::signature::{
        AccessorSignature, PropertyReader, SettingReader, SettingsNamespace,
    };
    use crate::utils::config::DEFAULT_TARGET_PROCESS;

    const GLOBAL_GET_INT: AccessorSignature =
        AccessorSignature::Setting(SettingsNamespace::Global, SettingReader::GetIntWithDefault);

    fn target_runtime() -> MemoryRuntime {
        MemoryRuntime::new(DEFAULT_TARGET_PROCESS)
            .with_setting(SettingsNamespace::Global, "adb_enabled", "1")
            .with_setting(SettingsNamespace::Secure, "adb_enabled", "1")
            .with_property("sys.usb.config", "mtp,adb")
            .with_property("ro.build.type", "user")
    }

    fn adb_call() -> AccessorCall {
        AccessorCall::new("adb_enabled")
            .with_context(ContextHandle(1))
            .with_default(AccessorValue::Int(1))
    }

    #[test]
    fn test_scenario_active_rule_returns_zero() {
        let mut host = target_runtime().with_preferences(r#"{"adb_enabled": true}"#);
        let mut module = OverrideModule::new(EngineConfig::default());

        let outcome = module.activate(&mut host);

        assert!(matches!(outcome, ActivationOutcome::Installed(_)));
        assert_eq!(module.state(), ModuleState::Installed);
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), AccessorValue::Int(0));
    }

    #[test]
    fn test_scenario_disabled_rule_passes_through() {
        let mut host = target_runtime().with_preferences(r#"{"adb_enabled": false}"#);
        let mut module = OverrideModule::new(EngineConfig::default());

        module.activate(&mut host);

        let genuine = host.genuine(GLOBAL_GET_INT).call(&adb_call());
        assert_eq!(genuine, AccessorValue::Int(1));
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), genuine);
    }

    #[test]
    fn test_scenario_other_process_untouched() {
        let mut host = MemoryRuntime::new("com.android.settings")
            .with_preferences(r#"{"adb_enabled": true}"#)
            .with_setting(SettingsNamespace::Global, "adb_enabled", "1");
        let mut module = OverrideModule::new(EngineConfig::default());

        let outcome = module.activate(&mut host);

        assert!(matches!(outcome, ActivationOutcome::OutOfScope));
        assert_eq!(module.state(), ModuleState::OutOfScope);
        assert_eq!(host.hooked_signatures(), 0);
        assert!(host.unload_requested());
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), AccessorValue::Int(1));
    }

    #[test]
    fn test_scenario_missing_preferences_fail_closed() {
        let mut host = target_runtime();
        let mut module = OverrideModule::new(EngineConfig::default());

        let outcome = module.activate(&mut host);

        assert!(matches!(
            outcome,
            ActivationOutcome::ConfigFailed(EngineError::ConfigNotFound(_))
        ));
        assert_eq!(module.state(), ModuleState::ConfigFailed);
        assert_eq!(host.hooked_signatures(), 0);
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), AccessorValue::Int(1));
    }

    #[test]
    fn test_scenario_string_substitute_via_integer_reader() {
        let mut host = target_runtime().with_preferences(r#"{"sys_usb_config": true}"#);
        let mut module = OverrideModule::new(EngineConfig::default());

        module.activate(&mut host);

        let call = AccessorCall::new("sys.usb.config").with_default(AccessorValue::Int(7));
        assert_eq!(
            host.invoke(AccessorSignature::Property(PropertyReader::GetInt), &call),
            AccessorValue::Int(0)
        );
        assert_eq!(
            host.invoke(
                AccessorSignature::Property(PropertyReader::Get),
                &AccessorCall::new("sys.usb.config")
            ),
            AccessorValue::string("mtp")
        );
    }

    #[test]
    fn test_missing_preferences_fail_open() {
        let mut host = target_runtime();
        let config = EngineConfig {
            missing_config_policy: MissingConfigPolicy::FailOpen,
            ..Default::default()
        };
        let mut module = OverrideModule::new(config);

        let outcome = module.activate(&mut host);

        assert!(matches!(outcome, ActivationOutcome::Installed(_)));
        assert!(module.snapshot().unwrap().is_active("secure_adb_enabled"));
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), AccessorValue::Int(0));
    }

    #[test]
    fn test_malformed_preferences_always_fail_closed() {
        let mut host = target_runtime().with_preferences("{adb_enabled: yes");
        let config = EngineConfig {
            missing_config_policy: MissingConfigPolicy::FailOpen,
            ..Default::default()
        };
        let mut module = OverrideModule::new(config);

        let outcome = module.activate(&mut host);

        assert!(matches!(
            outcome,
            ActivationOutcome::ConfigFailed(EngineError::ConfigMalformed(_))
        ));
        assert_eq!(host.hooked_signatures(), 0);
        assert!(host.unload_requested());
    }

    #[test]
    fn test_unmatched_keys_transparent_after_install() {
        let mut host = target_runtime().with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());
        module.activate(&mut host);

        let get = AccessorSignature::Property(PropertyReader::Get);
        let call = AccessorCall::new("ro.build.type");
        assert_eq!(host.invoke(get, &call), host.genuine(get).call(&call));
        assert_eq!(host.invoke(get, &call), AccessorValue::string("user"));
    }

    #[test]
    fn test_originals_captured_in_registry() {
        let mut host = target_runtime().with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());
        module.activate(&mut host);

        let registry = module.registry().unwrap();
        assert_eq!(registry.len(), AccessorSignature::all().len());

        let original = registry.original(GLOBAL_GET_INT).unwrap();
        assert_eq!(original.call(&adb_call()), AccessorValue::Int(1));
    }

    #[test]
    fn test_lifecycle_order_enforced() {
        let mut host = target_runtime().with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());

        assert!(matches!(
            module.load_configuration(&host),
            Err(EngineError::InvalidState(_))
        ));
        assert!(matches!(
            module.install_all(&mut host),
            Err(EngineError::InvalidState(_))
        ));

        assert!(module.check_scope(Some(DEFAULT_TARGET_PROCESS)));
        module.load_configuration(&host).unwrap();
        module.install_all(&mut host).unwrap();
        assert!(module.state().is_terminal());

        // No way back from Installed
        assert!(module.load_configuration(&host).is_err());
        assert!(module.install_all(&mut host).is_err());
        assert_eq!(host.hook_count(GLOBAL_GET_INT), 1);
    }

    #[test]
    fn test_repeated_activation_keeps_hooks_loaded() {
        let mut host = target_runtime().with_preferences(r#"{"adb_enabled": true}"#);
        let mut module = OverrideModule::new(EngineConfig::default());

        let first = match module.activate(&mut host) {
            ActivationOutcome::Installed(report) => report,
            other => panic!("unexpected outcome: {:?}", other),
        };
        let second = match module.activate(&mut host) {
            ActivationOutcome::Installed(report) => report,
            other => panic!("unexpected outcome: {:?}", other),
        };

        assert_eq!(first.installed.len(), second.installed.len());
        assert_eq!(module.state(), ModuleState::Installed);
        assert_eq!(host.hook_count(GLOBAL_GET_INT), 1);
        assert!(!host.unload_requested());
        assert_eq!(host.invoke(GLOBAL_GET_INT, &adb_call()), AccessorValue::Int(0));
    }

    #[test]
    fn test_repeated_activation_after_failure_is_stable() {
        let mut host = target_runtime();
        let mut module = OverrideModule::new(EngineConfig::default());

        module.activate(&mut host);
        let outcome = module.activate(&mut host);

        assert!(matches!(
            outcome,
            ActivationOutcome::ConfigFailed(EngineError::ConfigNotFound(_))
        ));
        assert_eq!(module.state(), ModuleState::ConfigFailed);
        assert_eq!(host.hooked_signatures(), 0);
    }

    #[test]
    fn test_activate_resumes_manual_lifecycle() {
        let mut host = target_runtime().with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());

        assert!(module.check_scope(Some(DEFAULT_TARGET_PROCESS)));
        module.load_configuration(&host).unwrap();

        assert!(matches!(module.activate(&mut host), ActivationOutcome::Installed(_)));
        assert!(!host.unload_requested());
        assert_eq!(host.hook_count(GLOBAL_GET_INT), 1);
    }

    #[test]
    fn test_scope_decision_idempotent() {
        let mut module = OverrideModule::new(EngineConfig::default());
        assert!(!module.check_scope(Some("com.other")));
        assert!(!module.check_scope(Some("com.other")));
        assert!(!module.check_scope(Some(DEFAULT_TARGET_PROCESS)));
        assert_eq!(module.state(), ModuleState::OutOfScope);
    }

    #[test]
    fn test_out_of_scope_module_refuses_work() {
        let mut host = MemoryRuntime::new("com.other").with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());
        assert!(!module.check_scope(Some("com.other")));

        match module.load_configuration(&host) {
            Err(EngineError::ScopeMismatch(identity)) => {
                assert_eq!(identity.as_deref(), Some("com.other"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            module.install_all(&mut host),
            Err(EngineError::ScopeMismatch(_))
        ));
        assert_eq!(host.hooked_signatures(), 0);
    }

    #[test]
    fn test_anonymous_process_out_of_scope() {
        let mut host = MemoryRuntime::anonymous().with_preferences("{}");
        let mut module = OverrideModule::new(EngineConfig::default());

        assert!(matches!(module.activate(&mut host), ActivationOutcome::OutOfScope));
        assert_eq!(host.hooked_signatures(), 0);
    }

    #[test]
    fn test_bootstrap_from_module_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("module.toml"),
            "target_process = \"com.example.bank\"\n",
        )
        .unwrap();

        let module = OverrideModule::bootstrap(dir.path()).unwrap();
        assert_eq!(module.config().target_process, "com.example.bank");
        assert_eq!(module.state(), ModuleState::Unchecked);
    }

    #[test]
    fn test_concurrent_reads_after_install() {
        let mut host = target_runtime().with_preferences(r#"{"adb_enabled": true, "secure_adb_enabled": false}"#);
        let mut module = OverrideModule::new(EngineConfig::default());
        module.activate(&mut host);

        let global = host.current(GLOBAL_GET_INT);
        let secure = host.current(AccessorSignature::Setting(
            SettingsNamespace::Secure,
            SettingReader::GetIntWithDefault,
        ));

        crossbeam::scope(|scope| {
            for _ in 0..8 {
                let global = global.clone();
                let secure = secure.clone();
                scope.spawn(move |_| {
                    for _ in 0..1_000 {
                        assert_eq!(global.call(&adb_call()), AccessorValue::Int(0));
                        assert_eq!(secure.call(&adb_call()), AccessorValue::Int(1));
                    }
                });
            }
        })
        .unwrap();
    }
}
