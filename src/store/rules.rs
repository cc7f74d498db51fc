//! JSON persistence of a rule collection.
//!
//! The engine keeps rules in memory only; hosts that want them to outlive a
//! session save and reload them through here.

use std::path::Path;

use crate::engine::RuleStore;
use crate::error::{MailRulesError, Result};
use crate::model::rule::Rule;

/// Load rules from `path`. A missing file yields an empty store.
pub fn load_rules(path: impl AsRef<Path>) -> Result<RuleStore> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No rules file, starting empty");
        return Ok(RuleStore::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| MailRulesError::io(path, e))?;
    let rules: Vec<Rule> =
        serde_json::from_str(&contents).map_err(|e| MailRulesError::json(path, e))?;
    tracing::info!(path = %path.display(), count = rules.len(), "Loaded rules");
    Ok(RuleStore::from_rules(rules))
}

/// Write all rules of `store` to `path` as pretty-printed JSON.
pub fn save_rules(path: impl AsRef<Path>, store: &RuleStore) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| MailRulesError::io(parent, e))?;
    }
    let contents = serde_json::to_string_pretty(store.list_rules())
        .map_err(|e| MailRulesError::json(path, e))?;
    std::fs::write(path, contents).map_err(|e| MailRulesError::io(path, e))?;
    tracing::info!(path = %path.display(), count = store.len(), "Saved rules");
    Ok(())
}
