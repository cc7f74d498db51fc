//! Ordered, in-memory rule collection.

use chrono::Utc;

use crate::model::rule::{Rule, RuleDefinition};

/// Rules in creation order (most recently created last).
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
    /// Highest id handed out so far, used to keep ids unique when the clock
    /// does not advance between two creations.
    last_id: u64,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a previously saved collection, keeping its order.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        let last_id = rules.iter().map(|r| r.id).max().unwrap_or(0);
        Self { rules, last_id }
    }

    /// Consume the store and return its rules in creation order.
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    /// Create an active rule from `definition` and append it.
    ///
    /// Conditions and actions are stored as given, without validation.
    pub fn create_rule(&mut self, definition: RuleDefinition) -> Rule {
        let created = Utc::now();
        let now_ms = u64::try_from(created.timestamp_millis()).unwrap_or(0);
        let id = match self.last_id.checked_add(1) {
            Some(next) => {
                let id = now_ms.max(next);
                self.last_id = id;
                id
            }
            None => {
                let id = self.lowest_free_id();
                tracing::warn!(id, "Rule ids exhausted at u64::MAX, reusing lowest free id");
                id
            }
        };

        let rule = Rule {
            id,
            name: definition.name,
            conditions: definition.conditions,
            actions: definition.actions,
            active: true,
            created,
        };
        tracing::debug!(
            id = rule.id,
            name = %rule.name,
            conditions = rule.conditions.len(),
            actions = rule.actions.len(),
            "Created rule"
        );
        self.rules.push(rule.clone());
        rule
    }

    /// Smallest id >= 1 that no stored rule uses.
    fn lowest_free_id(&self) -> u64 {
        let mut used: Vec<u64> = self.rules.iter().map(|r| r.id).collect();
        used.sort_unstable();
        used.dedup();
        let mut candidate = 1;
        for id in used {
            if id > candidate {
                break;
            }
            if id == candidate {
                candidate += 1;
            }
        }
        candidate
    }

    /// Flip `active` on the rule with this id.
    ///
    /// Returns the new state, or `None` (and changes nothing) if no rule has
    /// this id.
    pub fn toggle_rule(&mut self, id: u64) -> Option<bool> {
        let Some(rule) = self.rules.iter_mut().find(|r| r.id == id) else {
            tracing::debug!(id, "Toggle requested for unknown rule id");
            return None;
        };
        rule.active = !rule.active;
        tracing::debug!(id, active = rule.active, "Toggled rule");
        Some(rule.active)
    }

    /// All rules in creation order.
    pub fn list_rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: u64) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::rule::{Action, ConditionField};

    fn urgent() -> RuleDefinition {
        RuleDefinition::new("urgent")
            .when(ConditionField::Subject, "urgent")
            .then(Action::star())
    }

    #[test]
    fn test_create_rule_is_active_and_appended() {
        let mut store = RuleStore::new();
        let rule = store.create_rule(urgent());
        assert!(rule.active);
        assert_eq!(rule.name, "urgent");
        assert_eq!(store.list_rules(), &[rule]);
    }

    #[test]
    fn test_ids_unique_within_same_millisecond() {
        let mut store = RuleStore::new();
        let ids: Vec<u64> = (0..50).map(|_| store.create_rule(urgent()).id).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
    }

    #[test]
    fn test_list_in_creation_order() {
        let mut store = RuleStore::new();
        store.create_rule(RuleDefinition::new("first"));
        store.create_rule(RuleDefinition::new("second"));
        store.create_rule(RuleDefinition::new("third"));
        let names: Vec<&str> = store.list_rules().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn test_toggle_flips_state() {
        let mut store = RuleStore::new();
        let id = store.create_rule(urgent()).id;
        assert_eq!(store.toggle_rule(id), Some(false));
        assert!(!store.get(id).unwrap().active);
        assert_eq!(store.toggle_rule(id), Some(true));
        assert!(store.get(id).unwrap().active);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut store = RuleStore::new();
        store.create_rule(urgent());
        let before = store.list_rules().to_vec();
        assert_eq!(store.toggle_rule(42), None);
        assert_eq!(store.list_rules(), before.as_slice());
    }

    #[test]
    fn test_malformed_definition_stored_as_given() {
        let mut store = RuleStore::new();
        let rule = store.create_rule(RuleDefinition::new(""));
        assert!(rule.conditions.is_empty());
        assert!(rule.actions.is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_from_rules_continues_after_highest_id() {
        let mut store = RuleStore::new();
        store.create_rule(urgent());
        let mut restored = RuleStore::from_rules(store.clone().into_rules());
        let max = restored.list_rules()[0].id;
        let next = restored.create_rule(urgent());
        assert!(next.id > max);
    }

    #[test]
    fn test_create_after_max_id_does_not_overflow() {
        let mut seed = RuleStore::new();
        let mut top = seed.create_rule(urgent());
        top.id = u64::MAX;
        let mut store = RuleStore::from_rules(vec![top]);

        let a = store.create_rule(urgent()).id;
        let b = store.create_rule(urgent()).id;
        assert_ne!(a, u64::MAX);
        assert_ne!(b, u64::MAX);
        assert_ne!(a, b);
        assert_eq!(store.len(), 3);
    }
}
