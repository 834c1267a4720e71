// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only node types.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::consts::DEFAULT_EVENT_CAPACITY;
use crate::engine::{Node, NodeContext, NodeHeader, NodePosition, NodeShape, Port, PortPosition};
use crate::errors::NodeError;
use crate::registry::{NodeConstructors, NodeTypeDescriptor};
use crate::traits::{NodeBehavior, NodeTypeProvider};

/// `(source node id, payload)` for every input a [`RecordingNode`] received.
pub type RecordLog = Arc<Mutex<Vec<(String, Value)>>>;

fn header(id: &str, type_id: &str, activate_on_start: bool) -> NodeHeader {
    NodeHeader {
        id: id.to_string(),
        type_id: type_id.to_string(),
        name: id.to_string(),
        enabled: true,
        activate_on_start,
        position: NodePosition::default(),
    }
}

/// Records every input it receives and forwards it unchanged.
pub struct RecordingNode {
    log: RecordLog,
}

impl RecordingNode {
    pub fn new() -> (Self, RecordLog) {
        let log = RecordLog::default();
        (Self { log: Arc::clone(&log) }, log)
    }

    /// A recording node whose single input lists `parents` as its peers.
    pub fn node(id: &str, parents: Vec<String>) -> Arc<Node> {
        Self::node_with_input(id, Port::with_id(uuid::Uuid::now_v7(), "Input 1", parents, PortPosition::default()))
    }

    pub fn node_with_input(id: &str, input: Port) -> Arc<Node> {
        let (behavior, _log) = Self::new();
        Self::build(id, input, behavior)
    }

    /// A recording node plus the log of what it received.
    pub fn recorder(id: &str) -> (Arc<Node>, RecordLog) {
        let (behavior, log) = Self::new();
        let input = Port::new("Input 1", PortPosition::default());
        (Self::build(id, input, behavior), log)
    }

    /// A provider for a one-input, no-output type whose nodes all share one log.
    pub fn provider(type_id: &str) -> (RecordingProvider, RecordLog) {
        let log = RecordLog::default();
        (
            RecordingProvider {
                type_id: type_id.to_string(),
                log: Arc::clone(&log),
            },
            log,
        )
    }

    fn build(id: &str, input: Port, behavior: Self) -> Arc<Node> {
        let shape = NodeShape {
            header: header(id, "Recording", false),
            inputs: vec![input],
            outputs: vec![],
        };
        Arc::new(Node::new(shape, Box::new(behavior), DEFAULT_EVENT_CAPACITY))
    }
}

#[async_trait]
impl NodeBehavior for RecordingNode {
    async fn on_input(&self, ctx: &NodeContext, source: &Node, payload: Value) -> Result<(), NodeError> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((source.id().to_string(), payload.clone()));
        ctx.send(&payload);
        Ok(())
    }
}

pub struct RecordingProvider {
    type_id: String,
    log: RecordLog,
}

impl NodeTypeProvider for RecordingProvider {
    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(self.type_id.clone(), "Test").with_ports(1, 0)
    }

    fn constructors(&self) -> NodeConstructors {
        let fresh_log = Arc::clone(&self.log);
        let document_log = Arc::clone(&self.log);
        NodeConstructors::new(
            move |_shape, _services| {
                Ok(Box::new(RecordingNode {
                    log: Arc::clone(&fresh_log),
                }) as Box<dyn NodeBehavior>)
            },
            move |_shape, _fields, _services| {
                Ok(Box::new(RecordingNode {
                    log: Arc::clone(&document_log),
                }) as Box<dyn NodeBehavior>)
            },
        )
    }
}

/// Root node that sends a fixed payload once per run.
pub struct EmitterNode {
    payload: Value,
}

impl EmitterNode {
    /// An emitter whose single output feeds the input ports in `targets`.
    pub fn node(id: &str, payload: Value, targets: Vec<String>) -> Arc<Node> {
        let shape = NodeShape {
            header: header(id, "Emitter", true),
            inputs: vec![],
            outputs: vec![Port::with_id(
                uuid::Uuid::now_v7(),
                "Output",
                targets,
                PortPosition::default(),
            )],
        };
        Arc::new(Node::new(shape, Box::new(Self { payload }), DEFAULT_EVENT_CAPACITY))
    }
}

#[async_trait]
impl NodeBehavior for EmitterNode {
    async fn on_start(&self, ctx: &NodeContext) -> Result<(), NodeError> {
        ctx.send(&self.payload);
        Ok(())
    }

    async fn on_input(&self, ctx: &NodeContext, _source: &Node, payload: Value) -> Result<(), NodeError> {
        ctx.send(&payload);
        Ok(())
    }
}
