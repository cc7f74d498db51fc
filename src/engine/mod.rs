//! The automation engine: an ordered rule collection evaluated against emails.
//!
//! Evaluation is a single synchronous pass. For each rule, in creation
//! order, an active rule whose conditions all match has its actions applied
//! to the email in place. Nothing here returns an error: unknown condition
//! types never match, unknown action types do nothing, and forward failures
//! stay inside the [`Forwarder`].

pub mod actions;
pub mod matcher;
pub mod store;

use serde::Serialize;

use crate::forward::{Forwarder, LogForwarder};
use crate::model::email::Email;
use crate::model::rule::{Action, Condition, Rule, RuleDefinition};

pub use actions::execute_actions;
pub use matcher::{matches_conditions, matches_conditions_with, MatchOptions};
pub use store::RuleStore;

/// What happened to one rule while processing one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOutcome {
    /// Conditions matched and the actions were applied.
    Matched,
    /// The rule is inactive and was not evaluated.
    Skipped,
    /// Evaluated, conditions did not match.
    NoMatch,
    /// Contains an unknown condition type, so it can never match.
    Invalid,
}

/// Per-rule outcomes of a single [`AutomationEngine::process_email`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProcessReport {
    /// `(rule id, outcome)` in rule order.
    pub outcomes: Vec<(u64, RuleOutcome)>,
}

impl ProcessReport {
    /// Ids of the rules that fired.
    pub fn matched(&self) -> impl Iterator<Item = u64> + '_ {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == RuleOutcome::Matched)
            .map(|(id, _)| *id)
    }

    pub fn matched_count(&self) -> usize {
        self.matched().count()
    }

    pub fn outcome(&self, rule_id: u64) -> Option<RuleOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| *id == rule_id)
            .map(|(_, o)| *o)
    }
}

/// Rule store plus evaluator, with the forward capability injected.
#[derive(Debug)]
pub struct AutomationEngine<F: Forwarder = LogForwarder> {
    rules: RuleStore,
    forwarder: F,
    options: MatchOptions,
}

impl Default for AutomationEngine<LogForwarder> {
    fn default() -> Self {
        Self::new(LogForwarder)
    }
}

impl<F: Forwarder> AutomationEngine<F> {
    /// Empty engine that forwards through `forwarder`.
    pub fn new(forwarder: F) -> Self {
        Self::with_rules(RuleStore::new(), forwarder)
    }

    /// Engine over an existing rule collection (e.g. loaded from disk).
    pub fn with_rules(rules: RuleStore, forwarder: F) -> Self {
        Self {
            rules,
            forwarder,
            options: MatchOptions::default(),
        }
    }

    /// Replace the matching options.
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    pub fn forwarder(&self) -> &F {
        &self.forwarder
    }

    pub fn rules(&self) -> &RuleStore {
        &self.rules
    }

    pub fn into_rules(self) -> RuleStore {
        self.rules
    }

    // ── Rule management ────────────────────────────────────────

    /// See [`RuleStore::create_rule`].
    pub fn create_rule(&mut self, definition: RuleDefinition) -> Rule {
        self.rules.create_rule(definition)
    }

    /// See [`RuleStore::toggle_rule`].
    pub fn toggle_rule(&mut self, id: u64) -> Option<bool> {
        self.rules.toggle_rule(id)
    }

    /// See [`RuleStore::list_rules`].
    pub fn list_rules(&self) -> &[Rule] {
        self.rules.list_rules()
    }

    // ── Evaluation ─────────────────────────────────────────────

    /// Run every active rule against `email`, mutating it in place.
    ///
    /// The returned report is informational; the email is changed the same
    /// way whether or not the caller looks at it.
    pub fn process_email(&self, email: &mut Email) -> ProcessReport {
        let mut report = ProcessReport::default();

        for rule in self.rules.list_rules() {
            let outcome = if !rule.active {
                RuleOutcome::Skipped
            } else if self.matches_conditions(email, &rule.conditions) {
                tracing::debug!(rule = rule.id, name = %rule.name, "Rule matched");
                self.execute_actions(email, &rule.actions);
                RuleOutcome::Matched
            } else if rule.has_unknown_condition() {
                RuleOutcome::Invalid
            } else {
                RuleOutcome::NoMatch
            };
            report.outcomes.push((rule.id, outcome));
        }

        tracing::trace!(
            subject = %email.subject,
            matched = report.matched_count(),
            "Processed email"
        );
        report
    }

    /// `true` iff every condition matches under this engine's options.
    pub fn matches_conditions(&self, email: &Email, conditions: &[Condition]) -> bool {
        matches_conditions_with(email, conditions, self.options)
    }

    /// Apply `actions` to `email` using this engine's forwarder.
    pub fn execute_actions(&self, email: &mut Email, actions: &[Action]) {
        execute_actions(email, actions, &self.forwarder);
    }
}
