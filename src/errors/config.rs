// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use super::{RegistryError, StoreError};

/// Errors raised while loading runtime settings or building a runtime from them.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The settings file could not be read.
    #[error("Failed to read settings file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The settings file is not valid YAML for the settings schema.
    #[error("Failed to parse settings: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A setting parsed but holds an unusable value.
    #[error("Invalid setting '{setting}': {reason}")]
    Invalid { setting: &'static str, reason: String },

    /// The node type registry could not be assembled.
    #[error("Failed to register node types: {0}")]
    Registry(#[from] RegistryError),

    /// The key-value store could not be opened.
    #[error("Failed to open key-value store: {0}")]
    Store(#[from] StoreError),
}
