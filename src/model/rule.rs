//! Rules, conditions and actions.
//!
//! Nothing here is validated. A condition or action whose `type` is not
//! recognized is kept as [`ConditionField::Unknown`] / [`ActionKind::Unknown`]
//! with its original spelling, so it survives a save/load cycle and simply
//! never matches (or never acts) at evaluation time.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MailRulesError;

/// Which email field a condition inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionField {
    From,
    Subject,
    Body,
    /// Unrecognized type, stored verbatim.
    Unknown(String),
}

impl Default for ConditionField {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for ConditionField {
    fn from(s: String) -> Self {
        match s.as_str() {
            "from" => Self::From,
            "subject" => Self::Subject,
            "body" => Self::Body,
            _ => Self::Unknown(s),
        }
    }
}

impl From<ConditionField> for String {
    fn from(field: ConditionField) -> Self {
        match field {
            ConditionField::From => "from".into(),
            ConditionField::Subject => "subject".into(),
            ConditionField::Body => "body".into(),
            ConditionField::Unknown(s) => s,
        }
    }
}

/// What an action does when its rule fires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ActionKind {
    Star,
    Label,
    Forward,
    /// Unrecognized type, stored verbatim.
    Unknown(String),
}

impl Default for ActionKind {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for ActionKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "star" => Self::Star,
            "label" => Self::Label,
            "forward" => Self::Forward,
            _ => Self::Unknown(s),
        }
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        match kind {
            ActionKind::Star => "star".into(),
            ActionKind::Label => "label".into(),
            ActionKind::Forward => "forward".into(),
            ActionKind::Unknown(s) => s,
        }
    }
}

/// A substring predicate over one email field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Condition {
    #[serde(rename = "type")]
    pub field: ConditionField,
    pub value: String,
}

impl Condition {
    pub fn new(field: ConditionField, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }
}

/// A mutation or side effect applied to a matching email.
///
/// `value` is the label for [`ActionKind::Label`] and the destination for
/// [`ActionKind::Forward`]; `star` ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Action {
    pub fn star() -> Self {
        Self {
            kind: ActionKind::Star,
            value: None,
        }
    }

    pub fn label(label: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Label,
            value: Some(label.into()),
        }
    }

    pub fn forward(destination: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Forward,
            value: Some(destination.into()),
        }
    }
}

/// A named, toggleable association between conditions and actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique within a rule store. Millisecond timestamp of creation.
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub actions: Vec<Action>,
    pub active: bool,
    pub created: DateTime<Utc>,
}

impl Rule {
    /// `true` if any condition has a type the engine does not know.
    ///
    /// Such a rule can never match.
    pub fn has_unknown_condition(&self) -> bool {
        self.conditions
            .iter()
            .any(|c| matches!(c.field, ConditionField::Unknown(_)))
    }
}

/// Everything needed to create a rule; the store assigns id, state and timestamp.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub actions: Vec<Action>,
}

impl RuleDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn when(mut self, field: ConditionField, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::new(field, value));
        self
    }

    pub fn then(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

// ── Text form: `field:value` / `kind[:value]` ──────────────────

impl FromStr for Condition {
    type Err = MailRulesError;

    /// Parse `subject:urgent`. The field name is case-insensitive; the value is
    /// everything after the first `:` and is kept as typed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) = s.split_once(':').ok_or_else(|| MailRulesError::InvalidDefinition {
            input: s.to_string(),
            reason: "expected FIELD:VALUE".into(),
        })?;
        Ok(Self {
            field: ConditionField::from(field.trim().to_lowercase()),
            value: value.to_string(),
        })
    }
}

impl FromStr for Action {
    type Err = MailRulesError;

    /// Parse `star`, `label:work` or `forward:someone@example.com`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = match s.split_once(':') {
            Some((kind, value)) => (kind, Some(value.to_string())),
            None => (s, None),
        };
        let kind = kind.trim();
        if kind.is_empty() {
            return Err(MailRulesError::InvalidDefinition {
                input: s.to_string(),
                reason: "missing action type".into(),
            });
        }
        Ok(Self {
            kind: ActionKind::from(kind.to_lowercase()),
            value,
        })
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", String::from(self.field.clone()), self.value)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = String::from(self.kind.clone());
        match &self.value {
            Some(v) => write!(f, "{kind}:{v}"),
            None => write!(f, "{kind}"),
        }
    }
}
