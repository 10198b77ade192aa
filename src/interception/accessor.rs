// src/interception/accessor.rs
//! Accessor call model
//!
//! An [`Accessor`] is anything that can answer a read query: the genuine
//! runtime implementation handed back by the host, or one of our
//! interceptors standing in front of it.

use std::fmt;

/// Return kind of an accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Boolean,
    Integer,
    Long,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Long => "long",
        }
    }

    /// Value returned when there is nothing better to return
    pub fn zero(&self) -> AccessorValue {
        match self {
            ValueKind::String => AccessorValue::Str(None),
            ValueKind::Boolean => AccessorValue::Bool(false),
            ValueKind::Integer => AccessorValue::Int(0),
            ValueKind::Long => AccessorValue::Long(0),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value produced by an accessor
///
/// String accessors may legitimately return null, hence `Str(None)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessorValue {
    Str(Option<String>),
    Bool(bool),
    Int(i32),
    Long(i64),
}

impl AccessorValue {
    pub fn string(value: impl Into<String>) -> Self {
        AccessorValue::Str(Some(value.into()))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            AccessorValue::Str(_) => ValueKind::String,
            AccessorValue::Bool(_) => ValueKind::Boolean,
            AccessorValue::Int(_) => ValueKind::Integer,
            AccessorValue::Long(_) => ValueKind::Long,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AccessorValue::Str(value) => value.as_deref(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AccessorValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            AccessorValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            AccessorValue::Long(value) => Some(*value),
            _ => None,
        }
    }
}

/// Opaque handle to the caller's context object (e.g. a content resolver)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextHandle(pub usize);

/// Arguments of a single accessor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessorCall {
    /// Lookup key
    pub key: String,

    /// Caller-supplied default, for shapes that take one
    pub default: Option<AccessorValue>,

    /// Caller context, for setting readers
    pub context: Option<ContextHandle>,

    /// User scope, for `...ForUser` setting readers
    pub user: Option<i32>,
}

impl AccessorCall {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default: None,
            context: None,
            user: None,
        }
    }

    pub fn with_default(mut self, default: AccessorValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_context(mut self, context: ContextHandle) -> Self {
        self.context = Some(context);
        self
    }

    pub fn for_user(mut self, user: i32) -> Self {
        self.user = Some(user);
        self
    }
}

/// A read accessor
///
/// Implementations are shared across application threads once installed,
/// so they must not rely on interior mutability for correctness.
pub trait Accessor: Send + Sync {
    fn call(&self, call: &AccessorCall) -> AccessorValue;
}

impl<F> Accessor for F
where
    F: Fn(&AccessorCall) -> AccessorValue + Send + Sync,
{
    fn call(&self, call: &AccessorCall) -> AccessorValue {
        self(call)
    }
}
