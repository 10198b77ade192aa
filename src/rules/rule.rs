// src/rules/rule.rs
//! Override rule definition and value projection

use crate::interception::accessor::{AccessorValue, ValueKind};
use crate::interception::signature::{AccessorFamily, SettingsNamespace};
use crate::utils::errors::{EngineError, Result};
use tracing::debug;

/// Literals a boolean reader treats as true (case-sensitive)
pub const TRUTHY_LITERALS: [&str; 5] = ["1", "y", "yes", "on", "true"];

/// A compiled-in override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverrideRule {
    /// Accessor family the rule applies to
    pub family: AccessorFamily,

    /// Query key matched exactly against the call's key
    pub query_key: &'static str,

    /// Preference flag that gates the rule
    pub preference_key: &'static str,

    /// Canonical substitute, in display form
    pub substitute: &'static str,

    /// Natural kind of the substitute
    pub value_kind: ValueKind,

    /// Force numeric and boolean projections to zero
    pub hard_zero: bool,
}

impl OverrideRule {
    /// Setting rule for one alias namespace
    pub const fn setting(
        namespace: SettingsNamespace,
        query_key: &'static str,
        preference_key: &'static str,
        substitute: &'static str,
    ) -> Self {
        Self {
            family: AccessorFamily::Setting(namespace),
            query_key,
            preference_key,
            substitute,
            value_kind: ValueKind::Integer,
            hard_zero: false,
        }
    }

    /// Property rule
    pub const fn property(
        query_key: &'static str,
        preference_key: &'static str,
        substitute: &'static str,
        value_kind: ValueKind,
    ) -> Self {
        Self {
            family: AccessorFamily::Property,
            query_key,
            preference_key,
            substitute,
            value_kind,
            hard_zero: false,
        }
    }

    pub const fn hard_zero(self) -> Self {
        Self {
            hard_zero: true,
            ..self
        }
    }

    /// Synthesize the value a reader of `kind` should see
    ///
    /// Never fails: unparseable numeric substitutes project to zero.
    pub fn project(&self, kind: ValueKind) -> AccessorValue {
        match kind {
            ValueKind::String => AccessorValue::string(self.substitute),
            ValueKind::Boolean => AccessorValue::Bool(self.as_bool()),
            ValueKind::Integer => AccessorValue::Int(self.numeric::<i32>(kind)),
            ValueKind::Long => AccessorValue::Long(self.numeric::<i64>(kind)),
        }
    }

    fn as_bool(&self) -> bool {
        !self.hard_zero && TRUTHY_LITERALS.contains(&self.substitute)
    }

    fn numeric<T>(&self, kind: ValueKind) -> T
    where
        T: std::str::FromStr + Default,
    {
        if self.hard_zero {
            return T::default();
        }

        match self.parse_numeric::<T>(kind) {
            Ok(value) => value,
            Err(err) => {
                debug!("{} ({}): {}, using 0", self.query_key, self.family, err);
                T::default()
            }
        }
    }

    /// Base-10 parse of the substitute
    pub fn parse_numeric<T: std::str::FromStr>(&self, kind: ValueKind) -> Result<T> {
        self.substitute
            .parse::<T>()
            .map_err(|_| EngineError::ValueParseFailed {
                value: self.substitute.to_string(),
                kind: kind.as_str(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USB_CONFIG: OverrideRule =
        OverrideRule::property("sys.usb.config", "sys_usb_config", "mtp", ValueKind::String);

    const ADB_GLOBAL: OverrideRule =
        OverrideRule::setting(SettingsNamespace::Global, "adb_enabled", "adb_enabled", "0");

    #[test]
    fn test_string_projection_verbatim() {
        assert_eq!(USB_CONFIG.project(ValueKind::String), AccessorValue::string("mtp"));
        assert_eq!(
            USB_CONFIG.hard_zero().project(ValueKind::String),
            AccessorValue::string("mtp")
        );
    }

    #[test]
    fn test_numeric_parse_failure_is_zero() {
        assert_eq!(USB_CONFIG.project(ValueKind::Integer), AccessorValue::Int(0));
        assert_eq!(USB_CONFIG.project(ValueKind::Long), AccessorValue::Long(0));
        assert!(USB_CONFIG.parse_numeric::<i32>(ValueKind::Integer).is_err());
    }

    #[test]
    fn test_numeric_projection() {
        let rule = OverrideRule::property("sys.usb.ffs.ready", "ready", "42", ValueKind::Integer);
        assert_eq!(rule.project(ValueKind::Integer), AccessorValue::Int(42));
        assert_eq!(rule.project(ValueKind::Long), AccessorValue::Long(42));
        assert_eq!(rule.hard_zero().project(ValueKind::Integer), AccessorValue::Int(0));
        assert_eq!(ADB_GLOBAL.project(ValueKind::Integer), AccessorValue::Int(0));
    }

    #[test]
    fn test_integer_overflow_is_zero() {
        let rule = OverrideRule::property("k", "p", "9999999999", ValueKind::Long);
        assert_eq!(rule.project(ValueKind::Integer), AccessorValue::Int(0));
        assert_eq!(rule.project(ValueKind::Long), AccessorValue::Long(9_999_999_999));
    }

    #[test]
    fn test_boolean_projection() {
        let on = OverrideRule::property("k", "p", "true", ValueKind::Boolean);
        assert_eq!(on.project(ValueKind::Boolean), AccessorValue::Bool(true));
        assert_eq!(on.hard_zero().project(ValueKind::Boolean), AccessorValue::Bool(false));

        let upper = OverrideRule::property("k", "p", "TRUE", ValueKind::Boolean);
        assert_eq!(upper.project(ValueKind::Boolean), AccessorValue::Bool(false));

        assert_eq!(USB_CONFIG.project(ValueKind::Boolean), AccessorValue::Bool(false));
    }

    #[test]
    fn test_hard_zero_builder() {
        let rule = USB_CONFIG.hard_zero();
        assert!(rule.hard_zero);
        assert_eq!(rule.query_key, USB_CONFIG.query_key);
    }
}
