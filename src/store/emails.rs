//! The backend's JSON email store: one array of email objects per file.

use std::path::Path;

use crate::error::{MailRulesError, Result};
use crate::model::email::Email;

/// Load all emails from `path`. A missing file yields no emails.
pub fn load_emails(path: impl AsRef<Path>) -> Result<Vec<Email>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No email store, starting empty");
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| MailRulesError::io(path, e))?;
    let emails: Vec<Email> =
        serde_json::from_str(&contents).map_err(|e| MailRulesError::json(path, e))?;
    tracing::info!(path = %path.display(), count = emails.len(), "Loaded emails");
    Ok(emails)
}

/// Write `emails` to `path` as pretty-printed UTF-8 JSON.
pub fn save_emails(path: impl AsRef<Path>, emails: &[Email]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MailRulesError::io(parent, e))?;
    }
    let contents =
        serde_json::to_string_pretty(emails).map_err(|e| MailRulesError::json(path, e))?;
    std::fs::write(path, contents).map_err(|e| MailRulesError::io(path, e))?;
    tracing::info!(path = %path.display(), count = emails.len(), "Saved emails");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_store_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_emails(tmp.path().join("emails.json")).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("emails.json");
        let mut email = Email::new("a@b.c", "Olá", "Corpo da mensagem");
        email.starred = true;
        email.labels.push("trabalho".into());

        save_emails(&path, std::slice::from_ref(&email)).unwrap();
        let loaded = load_emails(&path).unwrap();
        assert_eq!(loaded, vec![email]);

        // UTF-8 is written as-is, not escaped.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Olá"));
    }

    #[test]
    fn test_not_an_array_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("emails.json");
        std::fs::write(&path, r#"{"from": "x"}"#).unwrap();
        assert!(load_emails(&path).is_err());
    }
}
