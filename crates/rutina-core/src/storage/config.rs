//! TOML-based application configuration.
//!
//! Stored at `~/.config/rutina/config.toml`. Every field has a default so
//! a missing or partial file always yields a working config. Settings are
//! also reachable generically through dot-separated key paths
//! (`policy.running`, `timer.tick_secs`), which is what the `config`
//! command group uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::runner::RunPolicy;
use crate::sync::SyncPolicy;

const CONFIG_FILE: &str = "config.toml";

fn default_tick_secs() -> u64 {
    1
}

/// Policy knobs for live runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PolicyConfig {
    /// How many steps may run at once: `concurrent` or `exclusive`.
    #[serde(default)]
    pub running: RunPolicy,
    /// What an edit does to a live run: `preserve` or `reset`.
    #[serde(default)]
    pub edit_sync: SyncPolicy,
}

/// Host tick cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Seconds between ticks when a host drives the run in a loop.
    #[serde(default = "default_tick_secs")]
    pub tick_secs: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_secs: default_tick_secs(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

impl Config {
    /// Path of the config file inside the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::DataDir(e.to_string()))?;
        Ok(dir.join(CONFIG_FILE))
    }

    /// Load the config, writing a default file on first use.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            let config = Config::default();
            config.save_to(&path)?;
            return Ok(config);
        }
        Self::load_from(&path)
    }

    /// Load, falling back to defaults if anything goes wrong. Hosts that
    /// only read policies use this; a broken file should not keep the
    /// timers from running.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read one setting by dot-separated path, rendered as a string.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let root = to_value(self)?;
        let mut current = &root;
        for part in key.split('.') {
            current = current
                .get(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }
        Ok(match current {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Change one setting by dot-separated path. The raw string is coerced
    /// to the type the setting already has; the whole config re-validates
    /// before the change lands, so an unknown enum value is rejected.
    /// Call [`save`](Config::save) to persist.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let mut root = to_value(self)?;

        let mut current = &mut root;
        let parts: Vec<&str> = key.split('.').collect();
        for (i, part) in parts.iter().enumerate() {
            let entry = current
                .as_object_mut()
                .and_then(|obj| obj.get_mut(*part))
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            if i + 1 == parts.len() {
                let coerced = coerce(entry, raw, key)?;
                *entry = coerced;
                break;
            }
            current = entry;
        }

        *self = serde_json::from_value(root).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

fn to_value(config: &Config) -> Result<Value, ConfigError> {
    serde_json::to_value(config).map_err(|e| ConfigError::InvalidValue {
        key: String::new(),
        message: e.to_string(),
    })
}

/// Parse a raw string into the JSON type the existing value has.
fn coerce(existing: &Value, raw: &str, key: &str) -> Result<Value, ConfigError> {
    let parsed = match existing {
        Value::Bool(_) => raw.parse::<bool>().ok().map(Value::Bool),
        Value::Number(_) => raw.parse::<i64>().ok().map(|n| Value::Number(n.into())),
        Value::String(_) => Some(Value::String(raw.to_string())),
        _ => None,
    };
    parsed.ok_or_else(|| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("cannot parse '{raw}'"),
    })
}
