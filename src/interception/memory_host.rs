// src/interception/memory_host.rs
//! In-process reference host
//!
//! A self-contained stand-in for the managed runtime: it owns a property
//! store and one settings store per namespace, answers reads with the same
//! semantics as the real accessors, and lets the engine swap methods the
//! way an injection framework would. Useful for embedding tests and
//! benchmarks; production hosts implement [`HookHost`] themselves.

use crate::interception::accessor::{Accessor, AccessorCall, AccessorValue};
use crate::interception::host::{HookError, HookHost};
use crate::interception::signature::{
    AccessorSignature, PropertyReader, SettingReader, SettingsNamespace,
};
use crate::preferences::loader::ConfigSource;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{self, Read};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
struct Store {
    properties: HashMap<String, String>,
    settings: HashMap<SettingsNamespace, HashMap<String, String>>,
}

/// Genuine runtime implementation of one accessor
struct RuntimeAccessor {
    signature: AccessorSignature,
    store: Arc<Store>,
}

impl RuntimeAccessor {
    fn property(&self, reader: PropertyReader, call: &AccessorCall) -> AccessorValue {
        let raw = self
            .store
            .properties
            .get(&call.key)
            .map(String::as_str)
            .unwrap_or("");

        match reader {
            PropertyReader::Get => AccessorValue::string(raw),
            PropertyReader::GetWithDefault => {
                if raw.is_empty() {
                    call.default.clone().unwrap_or(AccessorValue::Str(None))
                } else {
                    AccessorValue::string(raw)
                }
            }
            PropertyReader::GetBoolean => {
                let default = call.default.as_ref().and_then(AccessorValue::as_bool).unwrap_or(false);
                AccessorValue::Bool(match raw {
                    "1" | "y" | "yes" | "on" | "true" => true,
                    "0" | "n" | "no" | "off" | "false" => false,
                    _ => default,
                })
            }
            PropertyReader::GetInt => {
                let default = call.default.as_ref().and_then(AccessorValue::as_int).unwrap_or(0);
                AccessorValue::Int(raw.parse().unwrap_or(default))
            }
            PropertyReader::GetLong => {
                let default = call.default.as_ref().and_then(AccessorValue::as_long).unwrap_or(0);
                AccessorValue::Long(raw.parse().unwrap_or(default))
            }
        }
    }

    fn setting(
        &self,
        namespace: SettingsNamespace,
        reader: SettingReader,
        call: &AccessorCall,
    ) -> AccessorValue {
        let raw = self
            .store
            .settings
            .get(&namespace)
            .and_then(|values| values.get(&call.key));

        match reader {
            SettingReader::GetString | SettingReader::GetStringForUser => {
                AccessorValue::Str(raw.cloned())
            }
            SettingReader::GetInt => {
                AccessorValue::Int(raw.and_then(|v| v.parse().ok()).unwrap_or(0))
            }
            SettingReader::GetIntWithDefault => {
                let default = call.default.as_ref().and_then(AccessorValue::as_int).unwrap_or(0);
                AccessorValue::Int(raw.and_then(|v| v.parse().ok()).unwrap_or(default))
            }
        }
    }
}

impl Accessor for RuntimeAccessor {
    fn call(&self, call: &AccessorCall) -> AccessorValue {
        match self.signature {
            AccessorSignature::Property(reader) => self.property(reader, call),
            AccessorSignature::Setting(namespace, reader) => self.setting(namespace, reader, call),
        }
    }
}

/// In-memory managed runtime
pub struct MemoryRuntime {
    identity: Option<String>,
    preferences: Option<Vec<u8>>,
    store: Arc<Store>,
    missing: BTreeSet<AccessorSignature>,
    bound: BTreeMap<AccessorSignature, Arc<dyn Accessor>>,
    hook_counts: BTreeMap<AccessorSignature, usize>,
    unload_requested: bool,
}

impl MemoryRuntime {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            preferences: None,
            store: Arc::new(Store::default()),
            missing: BTreeSet::new(),
            bound: BTreeMap::new(),
            hook_counts: BTreeMap::new(),
            unload_requested: false,
        }
    }

    /// Runtime that cannot report the process identity
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            ..Self::new("")
        }
    }

    pub fn with_preferences(mut self, document: impl Into<Vec<u8>>) -> Self {
        self.preferences = Some(document.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.store)
            .properties
            .insert(key.into(), value.into());
        self
    }

    pub fn with_setting(
        mut self,
        namespace: SettingsNamespace,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Arc::make_mut(&mut self.store)
            .settings
            .entry(namespace)
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Simulate a runtime build that lacks `signature`
    pub fn without_accessor(mut self, signature: AccessorSignature) -> Self {
        self.missing.insert(signature);
        self
    }

    /// Call the accessor currently bound for `signature`, as application code would
    pub fn invoke(&self, signature: AccessorSignature, call: &AccessorCall) -> AccessorValue {
        self.current(signature).call(call)
    }

    /// Accessor currently bound for `signature`
    pub fn current(&self, signature: AccessorSignature) -> Arc<dyn Accessor> {
        match self.bound.get(&signature) {
            Some(accessor) => accessor.clone(),
            None => self.genuine(signature),
        }
    }

    /// The unmodified runtime implementation
    pub fn genuine(&self, signature: AccessorSignature) -> Arc<dyn Accessor> {
        Arc::new(RuntimeAccessor {
            signature,
            store: self.store.clone(),
        })
    }

    pub fn hook_count(&self, signature: AccessorSignature) -> usize {
        self.hook_counts.get(&signature).copied().unwrap_or(0)
    }

    pub fn hooked_signatures(&self) -> usize {
        self.bound.len()
    }

    pub fn unload_requested(&self) -> bool {
        self.unload_requested
    }
}

impl ConfigSource for MemoryRuntime {
    fn describe(&self) -> String {
        "<module dir>/config.json".to_string()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        match &self.preferences {
            Some(bytes) => Ok(Box::new(bytes.as_slice())),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no preferences delivered",
            )),
        }
    }
}

impl HookHost for MemoryRuntime {
    fn process_identity(&self) -> Option<String> {
        self.identity.clone()
    }

    fn config_source(&self) -> &dyn ConfigSource {
        self
    }

    fn hook(
        &mut self,
        signature: AccessorSignature,
        replacement: Arc<dyn Accessor>,
    ) -> Result<Arc<dyn Accessor>, HookError> {
        if self.missing.contains(&signature) {
            return Err(HookError::AccessorNotFound {
                class: signature.class_name().to_string(),
                method: signature.method_name().to_string(),
            });
        }

        let original = self.current(signature);
        self.bound.insert(signature, replacement);
        *self.hook_counts.entry(signature).or_insert(0) += 1;
        Ok(original)
    }

    fn allow_unload(&mut self) {
        self.unload_requested = true;
    }
}
