//! Application configuration.
//!
//! Configuration is loaded from a TOML file at:
//! 1. `$MAILRULES_CONFIG` (environment variable)
//! 2. `~/.config/mailrules/config.toml` (Linux/macOS)
//!    `%APPDATA%\mailrules\config.toml` (Windows)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::MatchOptions;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General behavior settings.
    pub general: GeneralConfig,
    /// Where rules are kept.
    pub rules: RulesConfig,
    /// Matching behaviour.
    pub engine: EngineConfig,
    /// What `forward` actions do.
    pub forward: ForwardConfig,
}

/// General behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Override data directory for the rules file, outbox and logs.
    pub data_dir: Option<PathBuf>,
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub log_level: String,
    /// Log file (default: `<data_dir>/mailrules.log`).
    pub log_file: Option<PathBuf>,
}

/// Rules file location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Path of the JSON rules file (default: `<data_dir>/rules.json`).
    pub file: Option<PathBuf>,
}

/// Matching behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compare `from` conditions case-insensitively, like subject and body.
    pub fold_sender_case: bool,
}

/// How forward actions are carried out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForwardConfig {
    /// "log" (only log the request) or "outbox" (write `.eml` files).
    pub mode: ForwardMode,
    /// Outbox directory (default: `<data_dir>/outbox`).
    pub outbox_dir: Option<PathBuf>,
    /// `From:` address of forwarded messages.
    pub sender: String,
}

/// Forwarder selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardMode {
    #[default]
    Log,
    Outbox,
}

// ── Default implementations ─────────────────────────────────────

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            mode: ForwardMode::Log,
            outbox_dir: None,
            sender: "mailrules@localhost".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            fold_sender_case: self.fold_sender_case,
        }
    }
}

// ── Load / save ─────────────────────────────────────────────────

/// Load configuration, searching standard locations.
///
/// Returns the default configuration if no file is found or on parse error.
pub fn load_config() -> Config {
    if let Some(path) = config_file_path() {
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<Config>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "Loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        tracing::warn!(
                            path = %path.display(),
                            error = %e,
                            "Failed to parse config, using defaults"
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Failed to read config file, using defaults"
                    );
                }
            }
        }
    }
    Config::default()
}

/// Save configuration to the standard location.
pub fn save_config(config: &Config) -> anyhow::Result<()> {
    let path = config_file_path()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config file path"))?;
    save_config_to(&path, config)
}

/// Save configuration to an explicit path.
pub fn save_config_to(path: &Path, config: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    tracing::info!(path = %path.display(), "Saved config");
    Ok(())
}

/// Determine the config file path (checking env var first, then standard dirs).
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(env_path) = std::env::var("MAILRULES_CONFIG") {
        return Some(PathBuf::from(env_path));
    }

    dirs::config_dir().map(|d| d.join("mailrules").join("config.toml"))
}

/// Return the data directory for the rules file, outbox and logs.
pub fn data_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.general.data_dir {
        return dir.clone();
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailrules")
}

/// Return the rules file path.
pub fn rules_file_path(config: &Config) -> PathBuf {
    config
        .rules
        .file
        .clone()
        .unwrap_or_else(|| data_dir(config).join("rules.json"))
}

/// Return the outbox directory used by the outbox forwarder.
pub fn outbox_dir(config: &Config) -> PathBuf {
    config
        .forward
        .outbox_dir
        .clone()
        .unwrap_or_else(|| data_dir(config).join("outbox"))
}

/// Return the log file path.
pub fn log_file_path(config: &Config) -> PathBuf {
    config
        .general
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir(config).join("mailrules.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.general.log_level, "warn");
        assert!(!cfg.engine.fold_sender_case);
        assert_eq!(cfg.forward.mode, ForwardMode::Log);
        assert!(cfg.rules.file.is_none());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let mut cfg = Config::default();
        cfg.forward.mode = ForwardMode::Outbox;
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let parsed: Config = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.forward.mode, ForwardMode::Outbox);
        assert_eq!(parsed.forward.sender, cfg.forward.sender);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let partial = r#"
[engine]
fold_sender_case = true

[forward]
mode = "outbox"
outbox_dir = "/tmp/outbox"
"#;
        let cfg: Config = toml::from_str(partial).expect("parse partial");
        assert!(cfg.engine.fold_sender_case);
        assert!(cfg.engine.match_options().fold_sender_case);
        assert_eq!(outbox_dir(&cfg), PathBuf::from("/tmp/outbox"));
        // Other fields use defaults
        assert_eq!(cfg.general.log_level, "warn");
        assert_eq!(cfg.forward.sender, "mailrules@localhost");
    }

    #[test]
    fn test_save_config_to_writes_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("mailrules").join("config.toml");
        let mut cfg = Config::default();
        cfg.engine.fold_sender_case = true;
        save_config_to(&path, &cfg).unwrap();

        let parsed: Config = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(parsed.engine.fold_sender_case);
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let mut cfg = Config::default();
        cfg.general.data_dir = Some(PathBuf::from("/srv/mailrules"));
        assert_eq!(rules_file_path(&cfg), PathBuf::from("/srv/mailrules/rules.json"));
        assert_eq!(outbox_dir(&cfg), PathBuf::from("/srv/mailrules/outbox"));
        assert_eq!(log_file_path(&cfg), PathBuf::from("/srv/mailrules/mailrules.log"));

        cfg.rules.file = Some(PathBuf::from("/etc/rules.json"));
        assert_eq!(rules_file_path(&cfg), PathBuf::from("/etc/rules.json"));
    }

    #[test]
    fn test_log_file_override() {
        let cfg: Config = toml::from_str(
            r#"
[general]
data_dir = "/srv/mailrules"
log_file = "/var/log/mailrules/engine.log"
"#,
        )
        .expect("parse");
        let path = log_file_path(&cfg);
        assert_eq!(path, PathBuf::from("/var/log/mailrules/engine.log"));
        assert_eq!(path.parent(), Some(Path::new("/var/log/mailrules")));
        assert_eq!(path.file_name().unwrap(), "engine.log");
    }
}
