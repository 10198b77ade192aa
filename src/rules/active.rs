// src/rules/active.rs
//! Active rule table
//!
//! The catalog filtered by the preferences snapshot. Built once during
//! activation; interceptors only ever read it.

use crate::interception::signature::AccessorFamily;
use crate::preferences::snapshot::ConfigurationSnapshot;
use crate::rules::catalog;
use crate::rules::rule::OverrideRule;
use std::collections::HashMap;
use tracing::debug;

/// Frozen set of active rules, indexed by family then query key
#[derive(Debug, Clone, Default)]
pub struct ActiveRuleTable {
    by_family: HashMap<AccessorFamily, HashMap<&'static str, &'static OverrideRule>>,
}

impl ActiveRuleTable {
    /// Filter the compiled-in catalog
    pub fn from_snapshot(snapshot: &ConfigurationSnapshot) -> Self {
        Self::build(catalog::all_rules(), snapshot)
    }

    /// Filter an arbitrary rule set
    pub fn build<I>(rules: I, snapshot: &ConfigurationSnapshot) -> Self
    where
        I: IntoIterator<Item = &'static OverrideRule>,
    {
        let mut by_family: HashMap<AccessorFamily, HashMap<&'static str, &'static OverrideRule>> =
            HashMap::new();

        for rule in rules {
            if !snapshot.is_active(rule.preference_key) {
                debug!(
                    "Rule {} ({}) disabled by preference {}",
                    rule.query_key, rule.family, rule.preference_key
                );
                continue;
            }

            by_family
                .entry(rule.family)
                .or_default()
                .insert(rule.query_key, rule);
        }

        Self { by_family }
    }

    /// Active rule for `key` within `family`
    pub fn lookup(&self, family: AccessorFamily, key: &str) -> Option<&'static OverrideRule> {
        self.by_family.get(&family)?.get(key).copied()
    }

    /// Whether any rule of `family` is active
    pub fn has_family(&self, family: AccessorFamily) -> bool {
        self.by_family
            .get(&family)
            .map_or(false, |rules| !rules.is_empty())
    }

    pub fn len(&self) -> usize {
        self.by_family.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interception::signature::SettingsNamespace;
    use std::collections::HashMap;

    fn snapshot(pairs: &[(&str, bool)], absent_default: bool) -> ConfigurationSnapshot {
        let flags = pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect();
        ConfigurationSnapshot::new(flags, absent_default)
    }

    #[test]
    fn test_all_rules_active_by_default() {
        let table = ActiveRuleTable::from_snapshot(&ConfigurationSnapshot::all_active());
        assert_eq!(table.len(), catalog::all_rules().count());
        assert!(table.has_family(AccessorFamily::Property));
    }

    #[test]
    fn test_disabled_preference_filters_rule() {
        let table = ActiveRuleTable::from_snapshot(&snapshot(&[("adb_enabled", false)], true));

        let global = AccessorFamily::Setting(SettingsNamespace::Global);
        let secure = AccessorFamily::Setting(SettingsNamespace::Secure);
        assert!(table.lookup(global, "adb_enabled").is_none());
        assert!(table.lookup(secure, "adb_enabled").is_some());
    }

    #[test]
    fn test_strict_snapshot_only_enables_listed() {
        let table = ActiveRuleTable::from_snapshot(&snapshot(&[("sys_usb_config", true)], false));

        assert_eq!(table.len(), 1);
        let rule = table.lookup(AccessorFamily::Property, "sys.usb.config").unwrap();
        assert_eq!(rule.substitute, "mtp");
        assert!(!table.has_family(AccessorFamily::Setting(SettingsNamespace::Global)));
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = ActiveRuleTable::from_snapshot(&ConfigurationSnapshot::all_active());
        assert!(table.lookup(AccessorFamily::Property, "sys.usb.config").is_some());
        assert!(table.lookup(AccessorFamily::Property, "SYS.USB.CONFIG").is_none());
        assert!(table.lookup(AccessorFamily::Property, "sys.usb").is_none());
        assert!(table
            .lookup(AccessorFamily::Property, "adb_enabled")
            .is_none());
    }

    #[test]
    fn test_empty_table() {
        let table = ActiveRuleTable::build(
            Vec::<&'static OverrideRule>::new(),
            &ConfigurationSnapshot::new(HashMap::new(), true),
        );
        assert!(table.is_empty());
    }
}
