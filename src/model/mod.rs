//! Core data model types: emails, rules, conditions and actions.

pub mod email;
pub mod rule;

pub use email::Email;
pub use rule::{Action, ActionKind, Condition, ConditionField, Rule, RuleDefinition};
