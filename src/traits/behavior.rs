// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::engine::{Node, NodeContext};
use crate::errors::NodeError;

/// Type-specific behaviour of a node.
///
/// The engine owns identity, ports, status and cancellation; a behaviour only
/// decides what to produce. Output goes through [`NodeContext::send`], which
/// fans the payload out to every connected input port.
#[async_trait]
pub trait NodeBehavior: Send + Sync {
    /// Called when the node is started by `Graph::run` or a manual trigger.
    async fn on_start(&self, ctx: &NodeContext) -> Result<(), NodeError> {
        let _ = ctx;
        Ok(())
    }

    /// Called when an upstream node delivers a parsed payload.
    async fn on_input(
        &self,
        ctx: &NodeContext,
        source: &Node,
        payload: Value,
    ) -> Result<(), NodeError>;

    /// Writes the type-specific fields of this node into its document object.
    fn write_config(&self, fields: &mut Map<String, Value>) {
        let _ = fields;
    }

    /// Clears type-specific transient state. Must be idempotent.
    fn reset(&self) {}
}
