// src/rules/mod.rs
//! Override rules
//!
//! - **Rule**: one override and its value projections
//! - **Catalog**: the compiled-in setting and property rules
//! - **Active**: the catalog filtered by the preferences snapshot
//!
//! # Matching
//!
//! ```text
//! (family, key) ──► ActiveRuleTable ──► Some(rule) ──► rule.project(kind)
//!                                   └─► None ──────► original accessor
//! ```

pub mod active;
pub mod catalog;
pub mod rule;

pub use active::ActiveRuleTable;
pub use catalog::{all_rules, PROPERTY_RULES, SETTING_RULES};
pub use rule::{OverrideRule, TRUTHY_LITERALS};
