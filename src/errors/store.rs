// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the shared key-value store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Key cannot be empty or whitespace")]
    InvalidKey,

    #[error("Key-value store is full ({capacity} entries); cannot add '{key}'")]
    CapacityExceeded { key: String, capacity: usize },

    #[error("Failed to serialize value for '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Key-value store I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Key-value store file '{path}' is not a JSON object: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
