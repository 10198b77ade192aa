// src/interception/signature.rs
//! Accessor signatures
//!
//! The runtime exposes the same logical readers under several classes. A
//! signature pins down one concrete method: which class, which name, which
//! argument shape. Families group signatures that share a rule namespace.

use crate::interception::accessor::ValueKind;
use std::fmt;

pub const SYSTEM_PROPERTIES_CLASS: &str = "android/os/SystemProperties";
pub const SETTINGS_GLOBAL_CLASS: &str = "android/provider/Settings$Global";
pub const SETTINGS_SECURE_CLASS: &str = "android/provider/Settings$Secure";

/// Alias namespaces of the setting readers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingsNamespace {
    /// Current home of the developer toggles
    Global,
    /// Deprecated alias still consulted by older code
    Secure,
}

impl SettingsNamespace {
    pub const ALL: [SettingsNamespace; 2] = [SettingsNamespace::Global, SettingsNamespace::Secure];

    pub fn class_name(&self) -> &'static str {
        match self {
            SettingsNamespace::Global => SETTINGS_GLOBAL_CLASS,
            SettingsNamespace::Secure => SETTINGS_SECURE_CLASS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingsNamespace::Global => "global",
            SettingsNamespace::Secure => "secure",
        }
    }
}

/// Rule namespace an accessor belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorFamily {
    Property,
    Setting(SettingsNamespace),
}

impl AccessorFamily {
    pub fn class_name(&self) -> &'static str {
        match self {
            AccessorFamily::Property => SYSTEM_PROPERTIES_CLASS,
            AccessorFamily::Setting(namespace) => namespace.class_name(),
        }
    }
}

impl fmt::Display for AccessorFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessorFamily::Property => f.write_str("property"),
            AccessorFamily::Setting(namespace) => write!(f, "setting:{}", namespace.as_str()),
        }
    }
}

/// Property readers: `(key)` or `(key, default)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyReader {
    Get,
    GetWithDefault,
    GetBoolean,
    GetInt,
    GetLong,
}

/// Setting readers: `(context, key[, default | user])`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingReader {
    GetString,
    GetStringForUser,
    GetInt,
    GetIntWithDefault,
}

/// One concrete interceptable method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccessorSignature {
    Property(PropertyReader),
    Setting(SettingsNamespace, SettingReader),
}

impl AccessorSignature {
    /// Every signature the engine knows how to intercept, grouped by family
    pub fn all() -> Vec<AccessorSignature> {
        let mut signatures = vec![
            AccessorSignature::Property(PropertyReader::Get),
            AccessorSignature::Property(PropertyReader::GetWithDefault),
            AccessorSignature::Property(PropertyReader::GetBoolean),
            AccessorSignature::Property(PropertyReader::GetInt),
            AccessorSignature::Property(PropertyReader::GetLong),
        ];

        for namespace in SettingsNamespace::ALL {
            signatures.extend([
                AccessorSignature::Setting(namespace, SettingReader::GetString),
                AccessorSignature::Setting(namespace, SettingReader::GetStringForUser),
                AccessorSignature::Setting(namespace, SettingReader::GetInt),
                AccessorSignature::Setting(namespace, SettingReader::GetIntWithDefault),
            ]);
        }

        signatures
    }

    pub fn family(&self) -> AccessorFamily {
        match self {
            AccessorSignature::Property(_) => AccessorFamily::Property,
            AccessorSignature::Setting(namespace, _) => AccessorFamily::Setting(*namespace),
        }
    }

    /// Kind of value the method returns
    pub fn value_kind(&self) -> ValueKind {
        match self {
            AccessorSignature::Property(PropertyReader::Get)
            | AccessorSignature::Property(PropertyReader::GetWithDefault) => ValueKind::String,
            AccessorSignature::Property(PropertyReader::GetBoolean) => ValueKind::Boolean,
            AccessorSignature::Property(PropertyReader::GetInt) => ValueKind::Integer,
            AccessorSignature::Property(PropertyReader::GetLong) => ValueKind::Long,
            AccessorSignature::Setting(_, SettingReader::GetString)
            | AccessorSignature::Setting(_, SettingReader::GetStringForUser) => ValueKind::String,
            AccessorSignature::Setting(_, SettingReader::GetInt)
            | AccessorSignature::Setting(_, SettingReader::GetIntWithDefault) => ValueKind::Integer,
        }
    }

    /// Whether the call shape carries a caller default
    pub fn takes_default(&self) -> bool {
        !matches!(
            self,
            AccessorSignature::Property(PropertyReader::Get)
                | AccessorSignature::Setting(_, SettingReader::GetString)
                | AccessorSignature::Setting(_, SettingReader::GetStringForUser)
                | AccessorSignature::Setting(_, SettingReader::GetInt)
        )
    }

    pub fn class_name(&self) -> &'static str {
        self.family().class_name()
    }

    pub fn method_name(&self) -> &'static str {
        match self {
            AccessorSignature::Property(PropertyReader::Get)
            | AccessorSignature::Property(PropertyReader::GetWithDefault) => "get",
            AccessorSignature::Property(PropertyReader::GetBoolean) => "getBoolean",
            AccessorSignature::Property(PropertyReader::GetInt) => "getInt",
            AccessorSignature::Property(PropertyReader::GetLong) => "getLong",
            AccessorSignature::Setting(_, SettingReader::GetString) => "getString",
            AccessorSignature::Setting(_, SettingReader::GetStringForUser) => "getStringForUser",
            AccessorSignature::Setting(_, SettingReader::GetInt)
            | AccessorSignature::Setting(_, SettingReader::GetIntWithDefault) => "getInt",
        }
    }

    /// JNI type descriptor of the method
    pub fn descriptor(&self) -> &'static str {
        match self {
            AccessorSignature::Property(PropertyReader::Get) => {
                "(Ljava/lang/String;)Ljava/lang/String;"
            }
            AccessorSignature::Property(PropertyReader::GetWithDefault) => {
                "(Ljava/lang/String;Ljava/lang/String;)Ljava/lang/String;"
            }
            AccessorSignature::Property(PropertyReader::GetBoolean) => "(Ljava/lang/String;Z)Z",
            AccessorSignature::Property(PropertyReader::GetInt) => "(Ljava/lang/String;I)I",
            AccessorSignature::Property(PropertyReader::GetLong) => "(Ljava/lang/String;J)J",
            AccessorSignature::Setting(_, SettingReader::GetString) => {
                "(Landroid/content/ContentResolver;Ljava/lang/String;)Ljava/lang/String;"
            }
            AccessorSignature::Setting(_, SettingReader::GetStringForUser) => {
                "(Landroid/content/ContentResolver;Ljava/lang/String;I)Ljava/lang/String;"
            }
            AccessorSignature::Setting(_, SettingReader::GetInt) => {
                "(Landroid/content/ContentResolver;Ljava/lang/String;)I"
            }
            AccessorSignature::Setting(_, SettingReader::GetIntWithDefault) => {
                "(Landroid/content/ContentResolver;Ljava/lang/String;I)I"
            }
        }
    }
}

impl fmt::Display for AccessorSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.class_name(), self.method_name(), self.descriptor())
    }
}
