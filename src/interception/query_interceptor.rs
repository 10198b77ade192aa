// src/interception/query_interceptor.rs
//! Query interceptor
//!
//! One generic handler serves every accessor signature: look the key up in
//! the active rule table, synthesize the substitute on a hit, otherwise hand
//! the untouched call to the captured original.
//!
//! Everything read here is frozen before the first application thread runs,
//! so the path takes no locks and writes nothing.

use crate::interception::accessor::{Accessor, AccessorCall, AccessorValue};
use crate::interception::manager::InterceptionBinding;
use crate::interception::signature::AccessorSignature;
use crate::rules::active::ActiveRuleTable;
use std::sync::Arc;
use tracing::{trace, warn};

/// Replacement handler for one accessor signature
pub struct QueryInterceptor {
    signature: AccessorSignature,
    rules: Arc<ActiveRuleTable>,
    binding: Arc<InterceptionBinding>,
}

impl QueryInterceptor {
    pub fn new(
        signature: AccessorSignature,
        rules: Arc<ActiveRuleTable>,
        binding: Arc<InterceptionBinding>,
    ) -> Self {
        Self {
            signature,
            rules,
            binding,
        }
    }

    pub fn signature(&self) -> AccessorSignature {
        self.signature
    }

    fn delegate(&self, call: &AccessorCall) -> AccessorValue {
        match self.binding.original() {
            Some(original) => original.call(call),
            None => {
                // Host called us before handing back the original
                warn!("{} invoked before its original was captured", self.signature);
                call.default
                    .clone()
                    .unwrap_or_else(|| self.signature.value_kind().zero())
            }
        }
    }
}

impl Accessor for QueryInterceptor {
    fn call(&self, call: &AccessorCall) -> AccessorValue {
        match self.rules.lookup(self.signature.family(), &call.key) {
            Some(rule) => {
                trace!("{} overridden for {}", call.key, self.signature.method_name());
                rule.project(self.signature.value_kind())
            }
            None => self.delegate(call),
        }
    }
}
