// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use thiserror::Error;

use super::{ConstructionError, GraphError, ValidationError};

/// Errors raised while loading or saving a graph document.
///
/// Every load-time variant names the offending node so a caller can point the
/// user at the exact entry in the document.
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Graph document I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Graph document stream error: {0}")]
    Stream(#[source] std::io::Error),

    #[error("Graph document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Graph document has no 'Nodes' array")]
    MissingNodes,

    #[error("Node #{index} ({}) has a malformed '{field}' field: {detail}", .node_id.as_deref().unwrap_or("unknown id"))]
    MalformedNode {
        index: usize,
        node_id: Option<String>,
        field: &'static str,
        detail: String,
    },

    #[error("Node '{node_id}' uses unknown node type '{type_id}'")]
    TypeResolution { node_id: String, type_id: String },

    #[error("Node '{node_id}' of type '{type_id}' rejected its configuration: {source}")]
    Construction {
        node_id: String,
        type_id: String,
        #[source]
        source: ConstructionError,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Graph validation failed:\n{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<ValidationError>),
}
