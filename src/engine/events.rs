// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::Duration;

/// Severity of a node message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for MessageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MessageLevel::Debug => "debug",
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Events published on a node's outbound channel.
///
/// Subscribe with [`crate::engine::Node::subscribe`]. Events are broadcast;
/// a slow subscriber loses the oldest events rather than blocking the node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeEvent {
    /// The node began handling a start or an input.
    Entered { node_id: String },
    /// The node finished handling a start or an input.
    Left { node_id: String, elapsed: Duration },
    /// A diagnostic attributed to the node.
    Message {
        node_id: String,
        level: MessageLevel,
        text: String,
    },
    /// The node produced a payload and dispatched it downstream.
    Output { node_id: String, payload: String },
}

impl NodeEvent {
    pub fn node_id(&self) -> &str {
        match self {
            NodeEvent::Entered { node_id }
            | NodeEvent::Left { node_id, .. }
            | NodeEvent::Message { node_id, .. }
            | NodeEvent::Output { node_id, .. } => node_id,
        }
    }
}
