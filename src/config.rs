use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{QuickSpaceError, QuickSpaceResult};

pub const CONFIG_FILE_NAME: &str = "quickspace.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub trigger: TriggerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Physical key code (`KeyboardEvent.code`) that fires a trigger.
    #[serde(default = "default_key_code")]
    pub key_code: String,
    /// Upper bound on the rule list fetch. `None` waits for the store indefinitely.
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub watch_mutations: bool,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            key_code: default_key_code(),
            fetch_timeout_ms: None,
            watch_mutations: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_key_code() -> String {
    "Space".to_string()
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> QuickSpaceResult<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> QuickSpaceResult<()> {
        if self.trigger.key_code.trim().is_empty() {
            return Err(QuickSpaceError::Config(
                "trigger.key_code must not be empty".into(),
            ));
        }
        if self.trigger.fetch_timeout_ms == Some(0) {
            return Err(QuickSpaceError::Config(
                "trigger.fetch_timeout_ms must be positive; omit it to disable the timeout".into(),
            ));
        }
        Ok(())
    }
}

fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            paths.push(parent.join(CONFIG_FILE_NAME));
        }
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(CONFIG_FILE_NAME));
    }
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("quickspace").join(CONFIG_FILE_NAME));
    }
    paths
}

fn first_existing(candidates: Vec<PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|candidate| {
        let exists = candidate.is_file();
        if exists {
            tracing::debug!(path = %candidate.display(), "config found");
        }
        exists
    })
}

/// Loads `quickspace.toml` from the first location that has one, or defaults.
///
/// Looks next to the executable, then in the working directory, then in the
/// user config directory.
pub fn load_config() -> QuickSpaceResult<EngineConfig> {
    load_first(candidate_paths())
}

fn load_first(candidates: Vec<PathBuf>) -> QuickSpaceResult<EngineConfig> {
    match first_existing(candidates) {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("no config file found; using defaults");
            Ok(EngineConfig::default())
        }
    }
}

pub fn load_config_from(path: &std::path::Path) -> QuickSpaceResult<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = EngineConfig::from_toml_str(&content)?;
    tracing::info!(path = %path.display(), key = %config.trigger.key_code, "config loaded");
    Ok(config)
}

pub fn save_config_to(path: &std::path::Path, config: &EngineConfig) -> QuickSpaceResult<()> {
    config.validate()?;
    let content = toml::to_string_pretty(config)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
