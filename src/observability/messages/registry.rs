// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node type registration.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A node type was added to the registry.
///
/// # Log Level
/// `debug!` - Startup detail
///
/// # Example
/// ```
/// use nodeflow::observability::messages::registry::NodeTypeRegistered;
///
/// let msg = NodeTypeRegistered {
///     type_id: "Inject",
///     group: "Core",
///     inputs: 0,
///     outputs: 1,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct NodeTypeRegistered<'a> {
    pub type_id: &'a str,
    pub group: &'a str,
    pub inputs: usize,
    pub outputs: usize,
}

impl Display for NodeTypeRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered node type '{}' in group '{}': {} inputs, {} outputs",
            self.type_id, self.group, self.inputs, self.outputs
        )
    }
}

impl StructuredLog for NodeTypeRegistered<'_> {
    fn log(&self) {
        tracing::debug!(
            type_id = self.type_id,
            group = self.group,
            inputs = self.inputs,
            outputs = self.outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_type_registered",
            span_name = name,
            type_id = self.type_id,
            group = self.group,
        )
    }
}
