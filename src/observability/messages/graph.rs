// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for graph membership, wiring and lifecycle.
//!
//! This module contains message types for logging events related to:
//! * Node construction by the factory
//! * Nodes entering and leaving the graph
//! * Port wiring
//! * Graph runs and shutdown

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;
use uuid::Uuid;

/// The factory built a node.
///
/// # Log Level
/// `debug!` - Construction detail
pub struct NodeCreated<'a> {
    pub node_id: &'a str,
    pub type_id: &'a str,
    pub inputs: usize,
    pub outputs: usize,
}

impl Display for NodeCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created {} node '{}' with {} inputs and {} outputs",
            self.type_id, self.node_id, self.inputs, self.outputs
        )
    }
}

impl StructuredLog for NodeCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            type_id = self.type_id,
            inputs = self.inputs,
            outputs = self.outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_created",
            span_name = name,
            node_id = self.node_id,
            type_id = self.type_id,
        )
    }
}

/// A node was placed in the graph arena.
///
/// # Log Level
/// `debug!` - Graph detail
///
/// # Example
/// ```
/// use nodeflow::observability::messages::graph::NodeAdded;
///
/// let msg = NodeAdded {
///     node_id: "0190a3c4-7c1e-7000-8000-000000000001",
///     type_id: "Debug",
///     slot: 3,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct NodeAdded<'a> {
    pub node_id: &'a str,
    pub type_id: &'a str,
    pub slot: usize,
}

impl Display for NodeAdded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Added {} node '{}' at slot {}",
            self.type_id, self.node_id, self.slot
        )
    }
}

impl StructuredLog for NodeAdded<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            type_id = self.type_id,
            slot = self.slot,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_added",
            span_name = name,
            node_id = self.node_id,
            slot = self.slot,
        )
    }
}

/// A node was removed and references to its ports were dropped.
///
/// # Log Level
/// `info!` - Graph structure changed
pub struct NodeRemoved<'a> {
    pub node_id: &'a str,
    pub scrubbed_references: usize,
}

impl Display for NodeRemoved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Removed node '{}' and {} peer references to it",
            self.node_id, self.scrubbed_references
        )
    }
}

impl StructuredLog for NodeRemoved<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            scrubbed_references = self.scrubbed_references,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_removed",
            span_name = name,
            node_id = self.node_id,
        )
    }
}

/// An output port was wired to an input port.
///
/// # Log Level
/// `debug!` - Graph detail
pub struct PortsConnected<'a> {
    pub output_id: &'a Uuid,
    pub input_id: &'a Uuid,
}

impl Display for PortsConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Connected output {} to input {}", self.output_id, self.input_id)
    }
}

impl StructuredLog for PortsConnected<'_> {
    fn log(&self) {
        tracing::debug!(
            output_id = %self.output_id,
            input_id = %self.input_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "ports_connected",
            span_name = name,
            output_id = %self.output_id,
            input_id = %self.input_id,
        )
    }
}

/// A graph run started its root nodes.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use nodeflow::observability::messages::graph::GraphRunStarted;
///
/// let msg = GraphRunStarted {
///     node_count: 5,
///     started: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GraphRunStarted {
    pub node_count: usize,
    pub started: usize,
}

impl Display for GraphRunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph run started: {} of {} nodes activated on start",
            self.started, self.node_count
        )
    }
}

impl StructuredLog for GraphRunStarted {
    fn log(&self) {
        tracing::info!(
            node_count = self.node_count,
            started = self.started,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_run",
            span_name = name,
            node_count = self.node_count,
            started = self.started,
        )
    }
}

/// The graph cancelled its scope and drained its tasks.
///
/// # Log Level
/// `info!` - Important operational event
pub struct GraphShutdown {
    pub pending_tasks: usize,
}

impl Display for GraphShutdown {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph shut down after draining {} pending tasks",
            self.pending_tasks
        )
    }
}

impl StructuredLog for GraphShutdown {
    fn log(&self) {
        tracing::info!(pending_tasks = self.pending_tasks, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "graph_shutdown",
            span_name = name,
            pending_tasks = self.pending_tasks,
        )
    }
}
