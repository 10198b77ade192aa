// src/rules/catalog.rs
//! Compiled-in override catalog
//!
//! Setting rules exist once per alias namespace. The namespaces name the
//! same toggle upstream, but each copy has its own preference key so either
//! can be switched off on its own.

use crate::interception::accessor::ValueKind;
use crate::interception::signature::SettingsNamespace::{Global, Secure};
use crate::rules::rule::OverrideRule;

pub const SETTING_RULES: &[OverrideRule] = &[
    OverrideRule::setting(Global, "adb_enabled", "adb_enabled", "0"),
    OverrideRule::setting(Secure, "adb_enabled", "secure_adb_enabled", "0"),
    OverrideRule::setting(
        Global,
        "development_settings_enabled",
        "development_settings_enabled",
        "0",
    ),
    OverrideRule::setting(
        Secure,
        "development_settings_enabled",
        "secure_development_settings_enabled",
        "0",
    ),
    OverrideRule::setting(Global, "adb_wifi_enabled", "adb_wifi_enabled", "0"),
    OverrideRule::setting(Secure, "adb_wifi_enabled", "secure_adb_wifi_enabled", "0"),
];

pub const PROPERTY_RULES: &[OverrideRule] = &[
    OverrideRule::property("sys.usb.config", "sys_usb_config", "mtp", ValueKind::String),
    OverrideRule::property("sys.usb.state", "sys_usb_state", "mtp", ValueKind::String),
    OverrideRule::property(
        "persist.sys.usb.config",
        "persist_sys_usb_config",
        "mtp",
        ValueKind::String,
    )
    .hard_zero(),
    // Service state: "stopped" reads as not-running through every projection
    OverrideRule::property("init.svc.adbd", "init_svc_adbd", "stopped", ValueKind::String)
        .hard_zero(),
    OverrideRule::property("sys.usb.ffs.ready", "sys_usb_ffs_ready", "0", ValueKind::Integer),
];

/// Every compiled-in rule
pub fn all_rules() -> impl Iterator<Item = &'static OverrideRule> {
    SETTING_RULES.iter().chain(PROPERTY_RULES.iter())
}

/// Every distinct preference key referenced by the catalog
pub fn preference_keys() -> Vec<&'static str> {
    let mut keys: Vec<&'static str> = all_rules().map(|rule| rule.preference_key).collect();
    keys.sort_unstable();
    keys.dedup();
    keys
}
