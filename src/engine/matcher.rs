//! Condition matching.
//!
//! `subject` and `body` are compared case-insensitively. `from` is compared
//! as stored unless [`MatchOptions::fold_sender_case`] is set.

use crate::model::email::Email;
use crate::model::rule::{Condition, ConditionField};

/// Knobs that change how conditions compare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Compare `from` conditions case-insensitively as well.
    pub fold_sender_case: bool,
}

/// `true` iff every condition matches (AND, short-circuit).
///
/// An empty list matches.
pub fn matches_conditions(email: &Email, conditions: &[Condition]) -> bool {
    matches_conditions_with(email, conditions, MatchOptions::default())
}

/// [`matches_conditions`] with explicit options.
pub fn matches_conditions_with(
    email: &Email,
    conditions: &[Condition],
    options: MatchOptions,
) -> bool {
    conditions
        .iter()
        .all(|condition| condition_matches(email, condition, options))
}

/// Evaluate a single condition. Unknown fields never match.
pub fn condition_matches(email: &Email, condition: &Condition, options: MatchOptions) -> bool {
    match condition.field {
        ConditionField::From if options.fold_sender_case => {
            contains_folded(&email.from, &condition.value)
        }
        ConditionField::From => email.from.contains(condition.value.as_str()),
        ConditionField::Subject => contains_folded(&email.subject, &condition.value),
        ConditionField::Body => contains_folded(&email.body, &condition.value),
        ConditionField::Unknown(_) => false,
    }
}

/// Case-insensitive substring match.
fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
