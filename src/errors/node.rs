// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for node construction and node execution.

use thiserror::Error;

use super::{RegistryError, StoreError};

/// A node type rejected the configuration it was constructed with.
#[derive(Error, Debug)]
pub enum ConstructionError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// The node type needs a shared service the runtime was not built with.
    #[error("Node type requires the {0}, which is not configured")]
    MissingService(&'static str),
}

/// Failure to produce a live node from a type id and a shape.
#[derive(Error, Debug)]
pub enum NodeCreationError {
    #[error("Cannot create node: {0}")]
    TypeResolution(#[from] RegistryError),

    #[error("Failed to construct node '{node_id}' of type '{type_id}': {source}")]
    Construction {
        node_id: String,
        type_id: String,
        #[source]
        source: ConstructionError,
    },
}

/// Run-time failures inside a node task.
///
/// These are never propagated to the caller that dispatched the work; they are
/// reported on the failing node's event channel and logged.
#[derive(Error, Debug)]
pub enum NodeError {
    #[error("Input from '{source_node}' is not valid JSON: {error}")]
    PayloadParse {
        source_node: String,
        error: serde_json::Error,
    },

    #[error("Output '{output_id}' connects to '{peer_id}', which does not resolve to a live input port")]
    PortResolution { output_id: String, peer_id: String },

    #[error("Required environment variable '{0}' is not set (or is empty)")]
    MissingEnvironmentVariable(String),

    #[error("Parameter '{name}' has invalid {expected} value '{value}'")]
    InvalidParameter {
        name: String,
        expected: &'static str,
        value: String,
    },

    #[error("Key-value store operation failed: {0}")]
    Store(#[from] StoreError),
}
