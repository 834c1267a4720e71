// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::consts::{
    DEFAULT_EVENT_CAPACITY, DEFAULT_FLUSH_INTERVAL_SECONDS, DEFAULT_MAX_ENTRIES,
    DEFAULT_STORE_FILE_NAME,
};
use crate::errors::ConfigError;

/// Runtime settings for the engine and its shared services.
///
/// Every field is optional in the YAML file; absent fields take their
/// defaults.
///
/// # Example
/// ```yaml
/// key_value_store:
///   file_name: KeyValueStore.json
///   flush_interval_seconds: 30   # 0 keeps the store in memory only
///   max_entries: 10000
/// engine:
///   event_capacity: 256
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeFlowSettings {
    pub key_value_store: KeyValueStoreSettings,
    pub engine: EngineSettings,
}

/// Settings for the shared key-value store.
///
/// # Fields
/// * `file_name` - File the store is mirrored to
/// * `flush_interval_seconds` - Seconds between flushes; 0 disables loading and flushing
/// * `max_entries` - Upper bound on distinct keys
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct KeyValueStoreSettings {
    pub file_name: PathBuf,
    pub flush_interval_seconds: u64,
    pub max_entries: usize,
}

impl Default for KeyValueStoreSettings {
    fn default() -> Self {
        Self {
            file_name: PathBuf::from(DEFAULT_STORE_FILE_NAME),
            flush_interval_seconds: DEFAULT_FLUSH_INTERVAL_SECONDS,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl KeyValueStoreSettings {
    /// Store mirrored to `file_name` every `flush_interval`.
    pub fn persisted(file_name: impl Into<PathBuf>, flush_interval: Duration) -> Self {
        Self {
            file_name: file_name.into(),
            flush_interval_seconds: flush_interval.as_secs().max(1),
            ..Self::default()
        }
    }

    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_seconds)
    }

    pub fn is_persistent(&self) -> bool {
        self.flush_interval_seconds > 0
    }
}

/// Settings for the execution engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Capacity of each node's event channel.
    pub event_capacity: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl NodeFlowSettings {
    /// Rejects values that parse but cannot be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key_value_store.max_entries == 0 {
            return Err(ConfigError::Invalid {
                setting: "key_value_store.max_entries",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.key_value_store.is_persistent()
            && self.key_value_store.file_name.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid {
                setting: "key_value_store.file_name",
                reason: "required when flush_interval_seconds is not 0".to_string(),
            });
        }
        if self.engine.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                setting: "engine.event_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse and validate settings from YAML text. Empty text yields the defaults.
pub fn parse_settings(yaml: &str) -> Result<NodeFlowSettings, ConfigError> {
    let settings = if yaml.trim().is_empty() {
        NodeFlowSettings::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    settings.validate()?;
    Ok(settings)
}

/// Load and validate settings from a YAML file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<NodeFlowSettings, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_settings(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parse_full_settings() {
        let yaml = r#"
key_value_store:
  file_name: state/kv.json
  flush_interval_seconds: 15
  max_entries: 50
engine:
  event_capacity: 32
"#;

        let settings = parse_settings(yaml).unwrap();
        assert_eq!(settings.key_value_store.file_name, PathBuf::from("state/kv.json"));
        assert_eq!(settings.key_value_store.flush_interval(), Duration::from_secs(15));
        assert!(settings.key_value_store.is_persistent());
        assert_eq!(settings.key_value_store.max_entries, 50);
        assert_eq!(settings.engine.event_capacity, 32);
    }

    #[test]
    fn test_absent_fields_take_defaults() {
        let settings = parse_settings("engine:\n  event_capacity: 8\n").unwrap();
        assert_eq!(settings.key_value_store, KeyValueStoreSettings::default());
        assert!(!settings.key_value_store.is_persistent());
        assert_eq!(settings.key_value_store.max_entries, 10_000);
        assert_eq!(settings.engine.event_capacity, 8);
    }

    #[test]
    fn test_empty_document_is_all_defaults() {
        assert_eq!(parse_settings("").unwrap(), NodeFlowSettings::default());
    }

    #[test]
    fn test_zero_max_entries_is_rejected() {
        let result = parse_settings("key_value_store:\n  max_entries: 0\n");
        match result {
            Err(ConfigError::Invalid { setting, .. }) => {
                assert_eq!(setting, "key_value_store.max_entries")
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_yaml_is_a_yaml_error() {
        let result = parse_settings("engine: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_load_settings_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "key_value_store:\n  flush_interval_seconds: 5").unwrap();

        let settings = load_settings(file.path()).unwrap();
        assert_eq!(settings.key_value_store.flush_interval_seconds, 5);
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        match load_settings(&path) {
            Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected Io, got {:?}", other),
        }
    }
}
