// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::engine::events::MessageLevel;
use crate::engine::{Graph, Node};
use crate::errors::NodeError;

/// What a running behaviour can see of its node and graph.
///
/// One context is created per run or per delivered input. It carries the
/// cancellation scope that was live when the work started, so a superseded
/// run observes its own cancellation even after a new run has begun.
#[derive(Clone)]
pub struct NodeContext {
    node: Arc<Node>,
    graph: Graph,
    cancellation: CancellationToken,
}

impl NodeContext {
    pub(crate) fn new(node: Arc<Node>, graph: Graph, cancellation: CancellationToken) -> Self {
        Self {
            node,
            graph,
            cancellation,
        }
    }

    pub fn node(&self) -> &Arc<Node> {
        &self.node
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Sends `payload` on every output port. Returns the number of edges dispatched.
    pub fn send(&self, payload: &Value) -> usize {
        self.node.send_to_connected(&self.graph, payload)
    }

    pub fn report(&self, level: MessageLevel, text: impl Into<String>) {
        self.node.report(level, text.into());
    }

    pub fn info(&self, text: impl Into<String>) {
        self.report(MessageLevel::Info, text);
    }

    pub fn warn(&self, text: impl Into<String>) {
        self.report(MessageLevel::Warning, text);
    }

    pub fn report_error(&self, error: &NodeError) {
        self.node.report_error(error);
    }

    /// Records `text` as the node's last output without sending anything.
    pub fn record_output(&self, text: impl Into<String>) {
        self.node.set_last_output(text.into());
    }

    pub fn set_progress(&self, percent: f64) {
        self.node.set_progress(percent);
    }
}
