//! Action execution.

use crate::forward::Forwarder;
use crate::model::email::Email;
use crate::model::rule::{Action, ActionKind};

/// Apply each action in order. One action's effect never prevents the next.
pub fn execute_actions<F: Forwarder + ?Sized>(
    email: &mut Email,
    actions: &[Action],
    forwarder: &F,
) {
    for action in actions {
        execute_action(email, action, forwarder);
    }
}

fn execute_action<F: Forwarder + ?Sized>(email: &mut Email, action: &Action, forwarder: &F) {
    match &action.kind {
        ActionKind::Star => email.starred = true,
        ActionKind::Label => match &action.value {
            Some(label) => email.labels.push(label.clone()),
            None => tracing::debug!("Label action without a label, skipped"),
        },
        ActionKind::Forward => {
            let destination = action.value.as_deref().unwrap_or_default();
            forwarder.forward(email, destination);
        }
        ActionKind::Unknown(kind) => {
            tracing::debug!(kind = %kind, "Unknown action type ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forward::RecordingForwarder;

    #[test]
    fn test_star_is_idempotent() {
        let rec = RecordingForwarder::new();
        let mut email = Email::default();
        execute_actions(&mut email, &[Action::star()], &rec);
        assert!(email.starred);
        execute_actions(&mut email, &[Action::star()], &rec);
        assert!(email.starred);
    }

    #[test]
    fn test_label_does_not_deduplicate() {
        let rec = RecordingForwarder::new();
        let mut email = Email::default();
        let actions = [Action::label("work"), Action::label("work")];
        execute_actions(&mut email, &actions, &rec);
        assert_eq!(email.labels, ["work", "work"]);
    }

    #[test]
    fn test_forward_delegates_with_destination() {
        let rec = RecordingForwarder::new();
        let mut email = Email::new("a@b.c", "hi", "");
        execute_actions(&mut email, &[Action::forward("me@x.org")], &rec);
        assert_eq!(rec.destinations(), ["me@x.org"]);
    }

    #[test]
    fn test_unknown_and_malformed_actions_are_noops() {
        let rec = RecordingForwarder::new();
        let mut email = Email::new("a@b.c", "hi", "");
        let before = email.clone();
        let actions = [
            Action {
                kind: ActionKind::Unknown("archive".into()),
                value: Some("x".into()),
            },
            Action {
                kind: ActionKind::Label,
                value: None,
            },
        ];
        execute_actions(&mut email, &actions, &rec);
        assert_eq!(email, before);
        assert!(rec.forwarded().is_empty());
    }

    #[test]
    fn test_actions_apply_in_order() {
        let rec = RecordingForwarder::new();
        let mut email = Email::default();
        let actions = [
            Action::label("a"),
            Action::star(),
            Action::forward("d"),
            Action::label("b"),
        ];
        execute_actions(&mut email, &actions, &rec);
        assert!(email.starred);
        assert_eq!(email.labels, ["a", "b"]);
        // The forwarded snapshot sees the state as of the forward action.
        let forwarded = rec.forwarded();
        let (_, snapshot) = &forwarded[0];
        assert!(snapshot.starred);
        assert_eq!(snapshot.labels, ["a"]);
    }
}
