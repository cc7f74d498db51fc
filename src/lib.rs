//! `mailrules` — rule-based email automation.
//!
//! This crate provides an automation engine that evaluates user-defined
//! rules (substring conditions on sender, subject and body) against emails
//! and applies their actions: star, label or forward. Around it sit the
//! pieces a host needs: rule and email persistence, `.eml` import,
//! forwarders and configuration.

pub mod config;
pub mod engine;
pub mod error;
pub mod forward;
pub mod model;
pub mod parser;
pub mod store;

pub use engine::{AutomationEngine, ProcessReport, RuleOutcome, RuleStore};
pub use model::{Action, ActionKind, Condition, ConditionField, Email, Rule, RuleDefinition};
