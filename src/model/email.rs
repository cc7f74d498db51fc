//! The email value rules are evaluated against.

use serde::{Deserialize, Deserializer, Serialize};

/// An email as held by the surrounding mail store.
///
/// Only `from`, `subject` and `body` are read by the engine, and only
/// `starred` and `labels` are ever written. Any other keys found in the
/// backend's JSON (`to`, `timestamp`, `id`, ...) are kept in `extra` so a
/// load/process/save cycle does not drop them.
///
/// The body is written under the backend's `message` key; `body` is accepted
/// on input. A JSON `null` in any known field reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Email {
    /// Sender as stored, e.g. `"Boss <boss@co.com>"` or `"boss@co.com"`.
    #[serde(deserialize_with = "null_as_default")]
    pub from: String,

    /// Subject line.
    #[serde(deserialize_with = "null_as_default")]
    pub subject: String,

    /// Plain-text body. The backend store calls this field `message`.
    #[serde(rename = "message", alias = "body", deserialize_with = "null_as_default")]
    pub body: String,

    /// Starred flag.
    #[serde(deserialize_with = "null_as_default")]
    pub starred: bool,

    /// Labels in the order they were applied. Duplicates are allowed.
    #[serde(deserialize_with = "null_as_default")]
    pub labels: Vec<String>,

    /// Fields owned by the mail store and passed through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Email {
    /// Build an unstarred, unlabelled email from its three matchable fields.
    pub fn new(
        from: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// `true` if `label` has been applied at least once.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }
}

/// Read `null` the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let email: Email = serde_json::from_str(r#"{"subject": "Hi"}"#).unwrap();
        assert_eq!(email.subject, "Hi");
        assert!(email.from.is_empty());
        assert!(email.body.is_empty());
        assert!(!email.starred);
        assert!(email.labels.is_empty());
    }

    #[test]
    fn test_backend_message_key_is_body() {
        let json = r#"{
            "subject": "Teste de Integração",
            "from": "desenvolvedor@site.com",
            "to": "api@gmailapipro.com",
            "message": "Este é um teste",
            "timestamp": "2024-05-01T10:00:00"
        }"#;
        let email: Email = serde_json::from_str(json).unwrap();
        assert_eq!(email.body, "Este é um teste");
        assert_eq!(email.extra["to"], "api@gmailapipro.com");
        assert_eq!(email.extra["timestamp"], "2024-05-01T10:00:00");
        assert!(!email.extra.contains_key("message"));
    }

    #[test]
    fn test_extra_fields_survive_serialization() {
        let mut email: Email =
            serde_json::from_str(r#"{"id": 7, "subject": "x", "labels": ["a"]}"#).unwrap();
        email.labels.push("b".into());
        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["labels"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_null_fields_read_as_empty() {
        let json = r#"{"from": null, "subject": "s", "message": null, "labels": null, "starred": null}"#;
        let email: Email = serde_json::from_str(json).unwrap();
        assert_eq!(email.subject, "s");
        assert!(email.from.is_empty());
        assert!(email.body.is_empty());
        assert!(!email.starred);
        assert!(email.labels.is_empty());
    }

    #[test]
    fn test_body_written_as_message() {
        let email: Email = serde_json::from_str(r#"{"body": "hello"}"#).unwrap();
        assert_eq!(email.body, "hello");
        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["message"], "hello");
        assert!(value.get("body").is_none());
    }

    #[test]
    fn test_has_label() {
        let mut email = Email::new("a@b.c", "s", "b");
        assert!(!email.has_label("work"));
        email.labels.push("work".into());
        assert!(email.has_label("work"));
    }
}
