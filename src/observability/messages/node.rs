// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node execution and diagnostics.
//!
//! This module contains message types for logging events related to:
//! * Entering and leaving a node's handler
//! * Fan-out of payloads to connected inputs
//! * Aborts, dropped inputs and repeat loops
//! * Diagnostics reported by node behaviours

use crate::engine::MessageLevel;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A node began handling a start or an input.
///
/// # Log Level
/// `debug!` - Execution trace
pub struct NodeEntered<'a> {
    pub node_id: &'a str,
    pub node_label: &'a str,
}

impl Display for NodeEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Entered {} ({})", self.node_label, self.node_id)
    }
}

impl StructuredLog for NodeEntered<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, node_label = self.node_label, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node",
            span_name = name,
            node_id = self.node_id,
            node_label = self.node_label,
        )
    }
}

/// A node finished handling a start or an input.
///
/// # Log Level
/// `debug!` - Execution trace
pub struct NodeLeft<'a> {
    pub node_id: &'a str,
    pub elapsed: Duration,
}

impl Display for NodeLeft<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Left {} after {:?}", self.node_id, self.elapsed)
    }
}

impl StructuredLog for NodeLeft<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            elapsed_ms = self.elapsed.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node_left",
            span_name = name,
            node_id = self.node_id,
            elapsed = ?self.elapsed,
        )
    }
}

/// A payload was dispatched to every connected input.
///
/// # Log Level
/// `debug!` - Execution trace
///
/// # Example
/// ```
/// use nodeflow::observability::messages::node::FanOutDispatched;
///
/// let msg = FanOutDispatched {
///     node_id: "0190a3c4-7c1e-7000-8000-000000000001",
///     edges: 3,
///     payload_size: 42,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct FanOutDispatched<'a> {
    pub node_id: &'a str,
    pub edges: usize,
    pub payload_size: usize,
}

impl Display for FanOutDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' sent {} bytes to {} connected inputs",
            self.node_id, self.payload_size, self.edges
        )
    }
}

impl StructuredLog for FanOutDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            edges = self.edges,
            payload_size = self.payload_size,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "fan_out",
            span_name = name,
            node_id = self.node_id,
            edges = self.edges,
        )
    }
}

/// A node's in-flight work was cancelled.
///
/// # Log Level
/// `info!` - Operator-visible state change
pub struct NodeAborted<'a> {
    pub node_id: &'a str,
    pub node_label: &'a str,
}

impl Display for NodeAborted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Aborted {} ({})", self.node_label, self.node_id)
    }
}

impl StructuredLog for NodeAborted<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, node_label = self.node_label, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_aborted", span_name = name, node_id = self.node_id)
    }
}

/// A disabled node ignored an input.
///
/// # Log Level
/// `debug!` - Expected during normal operation
pub struct InputDropped<'a> {
    pub node_id: &'a str,
    pub source_label: &'a str,
}

impl Display for InputDropped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Disabled node '{}' dropped input from {}",
            self.node_id, self.source_label
        )
    }
}

impl StructuredLog for InputDropped<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            source_label = self.source_label,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("input_dropped", span_name = name, node_id = self.node_id)
    }
}

/// A repeating node left its loop.
///
/// # Log Level
/// `info!` - Operator-visible state change
pub struct RepeatStopped<'a> {
    pub node_id: &'a str,
    pub cycles: u64,
}

impl Display for RepeatStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' stopped repeating after {} cycles",
            self.node_id, self.cycles
        )
    }
}

impl StructuredLog for RepeatStopped<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, cycles = self.cycles, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "repeat_stopped",
            span_name = name,
            node_id = self.node_id,
            cycles = self.cycles,
        )
    }
}

/// A diagnostic reported by a node behaviour.
///
/// # Log Level
/// Follows `level`: `debug!`, `info!`, `warn!` or `error!`.
pub struct NodeMessage<'a> {
    pub node_id: &'a str,
    pub node_label: &'a str,
    pub level: MessageLevel,
    pub text: &'a str,
}

impl Display for NodeMessage<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}", self.node_label, self.text)
    }
}

impl StructuredLog for NodeMessage<'_> {
    fn log(&self) {
        match self.level {
            MessageLevel::Debug => {
                tracing::debug!(node_id = self.node_id, node_label = self.node_label, "{}", self)
            }
            MessageLevel::Info => {
                tracing::info!(node_id = self.node_id, node_label = self.node_label, "{}", self)
            }
            MessageLevel::Warning => {
                tracing::warn!(node_id = self.node_id, node_label = self.node_label, "{}", self)
            }
            MessageLevel::Error => {
                tracing::error!(node_id = self.node_id, node_label = self.node_label, "{}", self)
            }
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "node_message",
            span_name = name,
            node_id = self.node_id,
            level = %self.level,
        )
    }
}
