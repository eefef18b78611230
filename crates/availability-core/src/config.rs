//! TOML-based deployment configuration.
//!
//! Stores:
//! - Capabilities offered to respondents (free-form spans, "maybe" spans)
//! - Whether every slot must be answered before submitting
//! - Selectable display timezones
//! - Submission rules applied when a response is checked
//!
//! Configuration is stored at `~/.config/availability/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cycle::Capabilities;
use crate::error::ConfigError;
use crate::validation::SubmissionRules;

/// Environment variable overriding the selectable timezones.
pub const TIMEZONES_ENV: &str = "CAL_TIMEZONES";

/// Capability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilitiesConfig {
    #[serde(default = "default_true")]
    pub allow_spans: bool,
    #[serde(default)]
    pub allow_maybe: bool,
    /// Off by default: unanswered slots are submitted as `Unknown`.
    #[serde(default)]
    pub require_all_slots_answered: bool,
}

/// Timezone configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimezonesConfig {
    #[serde(default = "default_timezones")]
    pub available: Vec<String>,
    #[serde(default = "default_timezone")]
    pub default: String,
}

/// Deployment configuration.
///
/// Serialized to/from TOML at `~/.config/availability/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capabilities: CapabilitiesConfig,
    #[serde(default)]
    pub timezones: TimezonesConfig,
    #[serde(default)]
    pub rules: SubmissionRules,
}

fn default_true() -> bool {
    true
}
fn default_timezones() -> Vec<String> {
    vec!["local".into(), "UTC".into()]
}
fn default_timezone() -> String {
    "local".into()
}

impl Default for CapabilitiesConfig {
    fn default() -> Self {
        Self {
            allow_spans: true,
            allow_maybe: false,
            require_all_slots_answered: false,
        }
    }
}

impl Default for TimezonesConfig {
    fn default() -> Self {
        Self {
            available: default_timezones(),
            default: default_timezone(),
        }
    }
}

/// Returns `~/.config/availability[-dev]/` based on AVAILABILITY_ENV.
///
/// Set AVAILABILITY_ENV=dev to use the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("AVAILABILITY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("availability-dev")
    } else {
        base_dir.join("availability")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::NoDataDir(e.to_string()))?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    // Optional numbers serialize as null until set.
                    serde_json::Value::Number(_) | serde_json::Value::Null => {
                        if value == "none" {
                            serde_json::Value::Null
                        } else {
                            value
                                .parse::<f64>()
                                .ok()
                                .and_then(serde_json::Number::from_f64)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        }
                    }
                    serde_json::Value::Array(_) => {
                        if value.trim_start().starts_with('[') {
                            serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                        } else {
                            serde_json::Value::Array(
                                value
                                    .split(',')
                                    .map(|s| serde_json::Value::String(s.trim().to_string()))
                                    .collect(),
                            )
                        }
                    }
                    serde_json::Value::Object(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default config file location.
    ///
    /// # Errors
    /// Fails if the config directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if absent.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if the file does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or defaults
    /// cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                tracing::info!(path = %path.display(), "wrote default configuration");
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, in memory only.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Capabilities handed to the interaction controller.
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            allow_spans: self.capabilities.allow_spans,
            allow_maybe: self.capabilities.allow_maybe,
            require_all_slots_answered: self.capabilities.require_all_slots_answered,
        }
    }

    /// Rules for checking a submission, including the answered-slots rule.
    pub fn submission_rules(&self) -> SubmissionRules {
        SubmissionRules {
            require_all_slots_answered: self.capabilities.require_all_slots_answered,
            ..self.rules.clone()
        }
    }

    /// Selectable timezones; `CAL_TIMEZONES` (comma-separated) wins over the file.
    pub fn timezones(&self) -> Vec<String> {
        match std::env::var(TIMEZONES_ENV) {
            Ok(list) if !list.trim().is_empty() => parse_timezone_list(&list),
            _ => self.timezones.available.clone(),
        }
    }
}

/// Split a comma-separated timezone list, dropping blanks.
pub fn parse_timezone_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
