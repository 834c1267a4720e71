// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The graph: an insertion-ordered arena of live nodes.
//!
//! Nodes sit in stable slots; freed slots are reused. Three indices map a
//! node id, an input port id and an output port id to a slot, so every
//! lookup made during fan-out is O(1) under the read lock. Mutations take
//! the write lock, and a node removed from the arena is gone from every
//! index at once: a later lookup of one of its ports fails fast with
//! [`GraphError::PortNotFound`].
//!
//! The graph also owns the task tracker every node task is spawned on and
//! the root cancellation token every node scope descends from, so a whole
//! flow can be cancelled and drained with [`Graph::shutdown`].

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use uuid::Uuid;

use crate::engine::{Node, NodeFactory, NodeHeader, NodePosition, Port, RunOutcome};
use crate::errors::{GraphError, NodeCreationError};
use crate::observability::messages::{graph::*, StructuredLog};

#[derive(Default)]
struct Arena {
    slots: Vec<Option<Arc<Node>>>,
    free: Vec<usize>,
    order: Vec<usize>,
    by_id: HashMap<String, usize>,
    by_input: HashMap<Uuid, usize>,
    by_output: HashMap<Uuid, usize>,
}

impl Arena {
    fn node(&self, slot: usize) -> Option<&Arc<Node>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn ordered(&self) -> Vec<Arc<Node>> {
        self.order
            .iter()
            .filter_map(|slot| self.node(*slot).cloned())
            .collect()
    }

    fn allocate(&mut self, node: Arc<Node>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }
}

struct GraphInner {
    state: RwLock<Arena>,
    tracker: TaskTracker,
    shutdown: CancellationToken,
}

/// Shared handle to a graph. Cloning is cheap; all clones see the same nodes.
#[derive(Clone)]
pub struct Graph {
    inner: Arc<GraphInner>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GraphInner {
                state: RwLock::new(Arena::default()),
                tracker: TaskTracker::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the nodes in insertion order.
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.read().ordered()
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.read().by_id.contains_key(node_id)
    }

    pub fn get(&self, node_id: &str) -> Result<Arc<Node>, GraphError> {
        let arena = self.read();
        arena
            .by_id
            .get(node_id)
            .and_then(|slot| arena.node(*slot).cloned())
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))
    }

    /// Adds a node. Its id and every one of its port ids must be new to the graph.
    pub fn add(&self, node: Arc<Node>) -> Result<(), GraphError> {
        let mut arena = self.write();

        if arena.by_id.contains_key(node.id()) {
            return Err(GraphError::DuplicateNodeId(node.id().to_string()));
        }

        let mut seen = HashSet::new();
        for port in node.inputs().iter().chain(node.outputs()) {
            let id = port.id();
            if !seen.insert(id) || arena.by_input.contains_key(&id) || arena.by_output.contains_key(&id) {
                return Err(GraphError::DuplicatePortId {
                    node_id: node.id().to_string(),
                    port_id: id.to_string(),
                });
            }
        }

        let slot = arena.allocate(Arc::clone(&node));
        arena.order.push(slot);
        arena.by_id.insert(node.id().to_string(), slot);
        for port in node.inputs() {
            arena.by_input.insert(port.id(), slot);
        }
        for port in node.outputs() {
            arena.by_output.insert(port.id(), slot);
        }
        drop(arena);

        NodeAdded {
            node_id: node.id(),
            type_id: node.type_id(),
            slot,
        }
        .log();
        Ok(())
    }

    /// Creates a node of `type_id` with descriptor defaults and adds it.
    ///
    /// The node gets a time-ordered id and the name `"<TypeId> <count + 1>"`.
    pub fn add_fresh(
        &self,
        factory: &NodeFactory,
        type_id: &str,
        x: i32,
        y: i32,
    ) -> Result<Arc<Node>, GraphError> {
        let descriptor = factory
            .descriptor(type_id)
            .map_err(NodeCreationError::from)?;

        let header = NodeHeader {
            id: Uuid::now_v7().to_string(),
            type_id: type_id.to_string(),
            name: format!("{} {}", type_id, self.len() + 1),
            enabled: descriptor.enabled,
            activate_on_start: descriptor.activate_on_start,
            position: NodePosition::new(x, y),
        };

        let node = factory.create_fresh(header)?;
        self.add(Arc::clone(&node))?;
        Ok(node)
    }

    /// Removes a node, aborts its work and drops every peer reference to its ports.
    ///
    /// Work already dispatched to the node may still run to completion.
    pub fn remove(&self, node_id: &str) -> Result<Arc<Node>, GraphError> {
        let (removed, remaining) = {
            let mut arena = self.write();
            let slot = arena
                .by_id
                .remove(node_id)
                .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
            let removed = arena.slots[slot]
                .take()
                .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

            for port in removed.inputs() {
                arena.by_input.remove(&port.id());
            }
            for port in removed.outputs() {
                arena.by_output.remove(&port.id());
            }
            arena.order.retain(|s| *s != slot);
            arena.free.push(slot);
            (removed, arena.ordered())
        };

        removed.abort();

        let stale: HashSet<Uuid> = removed
            .inputs()
            .iter()
            .chain(removed.outputs())
            .map(Port::id)
            .collect();

        let mut scrubbed = 0;
        for node in &remaining {
            for port in node.inputs().iter().chain(node.outputs()) {
                scrubbed += port.peers().retain(|peer| !refers_to(peer, &stale, node_id));
            }
        }

        NodeRemoved {
            node_id,
            scrubbed_references: scrubbed,
        }
        .log();
        Ok(removed)
    }

    /// The node owning the input port `port_id`.
    ///
    /// Fails with `PortNotFound` for unparsable ids, output ports and ports
    /// of removed nodes.
    pub fn find_by_port_id(&self, port_id: &str) -> Result<Arc<Node>, GraphError> {
        let id = parse_port_id(port_id)?;
        let arena = self.read();
        arena
            .by_input
            .get(&id)
            .and_then(|slot| arena.node(*slot).cloned())
            .ok_or_else(|| GraphError::PortNotFound(port_id.to_string()))
    }

    /// The node owning the output port `port_id`.
    pub fn find_by_output_port_id(&self, port_id: &str) -> Result<Arc<Node>, GraphError> {
        let id = parse_port_id(port_id)?;
        let arena = self.read();
        arena
            .by_output
            .get(&id)
            .and_then(|slot| arena.node(*slot).cloned())
            .ok_or_else(|| GraphError::PortNotFound(port_id.to_string()))
    }

    /// Wires an output port to an input port, editing both peer lists.
    ///
    /// Returns `false` when the two were already connected.
    pub fn connect(&self, output_id: Uuid, input_id: Uuid) -> Result<bool, GraphError> {
        let source = self.find_by_output_port_id(&output_id.to_string())?;
        let target = self.find_by_port_id(&input_id.to_string())?;
        let output = port_of(source.outputs(), output_id)?;
        let input = port_of(target.inputs(), input_id)?;

        let added = output.peers().add(&input_id.to_string());
        input.peers().add(&output_id.to_string());

        PortsConnected {
            output_id: &output_id,
            input_id: &input_id,
        }
        .log();
        Ok(added)
    }

    /// Removes the wire between an output port and an input port.
    ///
    /// Returns `false` when they were not connected.
    pub fn disconnect(&self, output_id: Uuid, input_id: Uuid) -> Result<bool, GraphError> {
        let source = self.find_by_output_port_id(&output_id.to_string())?;
        let target = self.find_by_port_id(&input_id.to_string())?;
        let output = port_of(source.outputs(), output_id)?;
        let input = port_of(target.inputs(), input_id)?;

        let removed = output.peers().remove(&input_id.to_string());
        input.peers().remove(&output_id.to_string());
        Ok(removed)
    }

    /// Resets every node, then starts every enabled root node in insertion order.
    ///
    /// Does not wait for any node. Returns the number of nodes started.
    pub fn run(&self) -> usize {
        let nodes = self.nodes();
        for node in &nodes {
            node.reset();
        }

        let started = nodes
            .iter()
            .filter(|node| node.run(self) == RunOutcome::Started)
            .count();

        GraphRunStarted {
            node_count: nodes.len(),
            started,
        }
        .log();
        started
    }

    /// Signals every node's current cancellation scope.
    pub fn abort(&self) {
        for node in self.nodes() {
            node.abort();
        }
    }

    /// Cancels the root scope and waits for every tracked task to finish.
    pub async fn shutdown(&self) {
        let pending = self.inner.tracker.len();
        self.inner.shutdown.cancel();
        self.inner.tracker.close();
        self.inner.tracker.wait().await;
        GraphShutdown {
            pending_tasks: pending,
        }
        .log();
    }

    /// Spawns `task` on the graph's tracker.
    pub fn spawn<F>(&self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.inner.tracker.spawn(task)
    }

    /// Number of node tasks still running.
    pub fn active_tasks(&self) -> usize {
        self.inner.tracker.len()
    }

    /// Root scope every node scope descends from.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.shutdown
    }

    fn read(&self) -> RwLockReadGuard<'_, Arena> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Arena> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("nodes", &self.len())
            .field("active_tasks", &self.active_tasks())
            .finish()
    }
}

fn port_of(ports: &[Port], id: Uuid) -> Result<&Port, GraphError> {
    ports
        .iter()
        .find(|port| port.id() == id)
        .ok_or_else(|| GraphError::PortNotFound(id.to_string()))
}

fn parse_port_id(port_id: &str) -> Result<Uuid, GraphError> {
    Uuid::parse_str(port_id).map_err(|_| GraphError::PortNotFound(port_id.to_string()))
}

/// Legacy documents store parent node ids in input peer lists, so the
/// removed node's own id counts as a reference too.
fn refers_to(peer: &str, stale_ports: &HashSet<Uuid>, node_id: &str) -> bool {
    match Uuid::parse_str(peer) {
        Ok(id) => stale_ports.contains(&id) || peer == node_id,
        Err(_) => peer == node_id,
    }
}
