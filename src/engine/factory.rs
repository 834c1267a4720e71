// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::consts::{DEFAULT_EVENT_CAPACITY, FRESH_PORT_POSITION};
use crate::engine::port::{Port, PortPosition};
use crate::engine::{Node, NodeHeader, NodeShape};
use crate::errors::{ConstructionError, NodeCreationError, RegistryError};
use crate::observability::messages::{graph::NodeCreated, StructuredLog};
use crate::registry::{NodeTypeDescriptor, NodeTypeRegistry};
use crate::storage::KeyValueStore;
use crate::traits::{EnvironmentSource, ProcessEnvironment};

/// Shared services handed to node constructors.
#[derive(Clone)]
pub struct NodeServices {
    pub store: Option<Arc<KeyValueStore>>,
    pub environment: Arc<dyn EnvironmentSource>,
}

impl NodeServices {
    pub fn new() -> Self {
        Self {
            store: None,
            environment: Arc::new(ProcessEnvironment),
        }
    }

    pub fn with_store(mut self, store: Arc<KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentSource>) -> Self {
        self.environment = environment;
        self
    }

    /// The key-value store, or `MissingService` for types that cannot run without it.
    pub fn require_store(&self) -> Result<Arc<KeyValueStore>, ConstructionError> {
        self.store
            .clone()
            .ok_or(ConstructionError::MissingService("key-value store"))
    }
}

impl Default for NodeServices {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeServices")
            .field("store", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds live nodes from a fresh header or from a document entry.
#[derive(Clone, Debug)]
pub struct NodeFactory {
    registry: Arc<NodeTypeRegistry>,
    services: NodeServices,
    event_capacity: usize,
}

impl NodeFactory {
    pub fn new(registry: Arc<NodeTypeRegistry>, services: NodeServices) -> Self {
        Self {
            registry,
            services,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    pub fn registry(&self) -> &Arc<NodeTypeRegistry> {
        &self.registry
    }

    pub fn services(&self) -> &NodeServices {
        &self.services
    }

    pub fn descriptor(&self, type_id: &str) -> Result<&NodeTypeDescriptor, RegistryError> {
        Ok(&self.registry.resolve(type_id)?.descriptor)
    }

    /// Creates a node with ports allocated from its descriptor.
    ///
    /// Inputs are named `Input N` and outputs `Output N`; the type's fresh
    /// constructor may reshape them before the node is built.
    pub fn create_fresh(&self, header: NodeHeader) -> Result<Arc<Node>, NodeCreationError> {
        let entry = self.registry.resolve(&header.type_id)?;
        let descriptor = &entry.descriptor;

        let mut shape = NodeShape {
            inputs: numbered_ports("Input", descriptor.number_of_inputs),
            outputs: numbered_ports("Output", descriptor.number_of_outputs),
            header,
        };

        let behavior = (entry.constructors.fresh)(&mut shape, &self.services)
            .map_err(|source| construction_failed(&shape.header, source))?;

        Ok(self.build(shape, behavior))
    }

    /// Rebuilds a node from already-parsed ports and its raw document object.
    pub fn create_from_document(
        &self,
        header: NodeHeader,
        outputs: Vec<Port>,
        inputs: Vec<Port>,
        fields: &Map<String, Value>,
    ) -> Result<Arc<Node>, NodeCreationError> {
        let entry = self.registry.resolve(&header.type_id)?;
        let shape = NodeShape {
            header,
            inputs,
            outputs,
        };

        let behavior = (entry.constructors.from_document)(&shape, fields, &self.services)
            .map_err(|source| construction_failed(&shape.header, source))?;

        Ok(self.build(shape, behavior))
    }

    fn build(&self, shape: NodeShape, behavior: Box<dyn crate::traits::NodeBehavior>) -> Arc<Node> {
        NodeCreated {
            node_id: &shape.header.id,
            type_id: &shape.header.type_id,
            inputs: shape.inputs.len(),
            outputs: shape.outputs.len(),
        }
        .log();
        Arc::new(Node::new(shape, behavior, self.event_capacity))
    }
}

fn numbered_ports(prefix: &str, count: usize) -> Vec<Port> {
    let (x, y) = FRESH_PORT_POSITION;
    (1..=count)
        .map(|n| Port::new(format!("{} {}", prefix, n), PortPosition::new(x, y)))
        .collect()
}

fn construction_failed(header: &NodeHeader, source: ConstructionError) -> NodeCreationError {
    NodeCreationError::Construction {
        node_id: header.id.clone(),
        type_id: header.type_id.clone(),
        source,
    }
}
