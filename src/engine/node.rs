// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The live node: identity, ports, status, cancellation and event channel.
//!
//! A node moves through `Idle → Running → (Idle | RepeatWaiting)`. The
//! engine owns every transition except the ones inside a behaviour's own
//! loop; a behaviour sees the node only through its [`NodeContext`].

use serde_json::Value;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::engine::events::{MessageLevel, NodeEvent};
use crate::engine::port::Port;
use crate::engine::{Graph, NodeContext};
use crate::errors::NodeError;
use crate::observability::messages::{node::*, StructuredLog};
use crate::traits::NodeBehavior;

/// Integer placement of a node on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodePosition {
    pub x: i32,
    pub y: i32,
}

impl NodePosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Identity and flags shared by every node type.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeHeader {
    pub id: String,
    pub type_id: String,
    pub name: String,
    pub enabled: bool,
    pub activate_on_start: bool,
    pub position: NodePosition,
}

/// Everything about a node except its behaviour; what constructors work on.
#[derive(Debug, Clone)]
pub struct NodeShape {
    pub header: NodeHeader,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
}

/// Transient run-time status, cleared by [`Node::reset`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStatus {
    /// Progress of the current wait, 0 to 100.
    pub progress: f64,
    /// Last message reported by the node.
    pub message: String,
    /// Last payload the node sent, pretty-printed.
    pub last_output: Option<String>,
}

/// Result of [`Node::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Started,
    /// The node is not a root; nothing was started.
    NotActivatedOnStart,
    Disabled,
}

pub struct Node {
    header: NodeHeader,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    behavior: Box<dyn NodeBehavior>,
    status: Mutex<NodeStatus>,
    cancellation: Mutex<Option<CancellationToken>>,
    events: broadcast::Sender<NodeEvent>,
}

impl Node {
    pub fn new(shape: NodeShape, behavior: Box<dyn NodeBehavior>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            header: shape.header,
            inputs: shape.inputs,
            outputs: shape.outputs,
            behavior,
            status: Mutex::new(NodeStatus::default()),
            cancellation: Mutex::new(None),
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.header.id
    }

    pub fn type_id(&self) -> &str {
        &self.header.type_id
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn is_enabled(&self) -> bool {
        self.header.enabled
    }

    pub fn activate_on_start(&self) -> bool {
        self.header.activate_on_start
    }

    pub fn position(&self) -> NodePosition {
        self.header.position
    }

    pub fn header(&self) -> &NodeHeader {
        &self.header
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn behavior(&self) -> &dyn NodeBehavior {
        self.behavior.as_ref()
    }

    /// `Name:TypeId`, used in diagnostics.
    pub fn label(&self) -> String {
        format!("{}:{}", self.header.name, self.header.type_id)
    }

    pub fn status(&self) -> NodeStatus {
        self.lock_status().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NodeEvent> {
        self.events.subscribe()
    }

    /// True while a cancellation scope is live for this node.
    pub fn is_active(&self) -> bool {
        self.lock_cancellation()
            .as_ref()
            .is_some_and(|token| !token.is_cancelled())
    }

    /// Clears transient status. Calling it twice is the same as calling it once.
    pub fn reset(&self) {
        *self.lock_status() = NodeStatus::default();
        self.behavior.reset();
    }

    /// Signals the current cancellation scope. Does not wait for the work to stop.
    pub fn abort(&self) {
        if let Some(token) = self.lock_cancellation().as_ref() {
            token.cancel();
            NodeAborted {
                node_id: &self.header.id,
                node_label: &self.label(),
            }
            .log();
        }
    }

    /// Starts the node as a root of the flow.
    ///
    /// Supersedes any previous run: the previous scope is cancelled but not
    /// awaited. The work is spawned on the graph's tracker and this call
    /// returns immediately.
    pub fn run(self: &Arc<Self>, graph: &Graph) -> RunOutcome {
        if !self.header.activate_on_start {
            return RunOutcome::NotActivatedOnStart;
        }
        if !self.header.enabled {
            return RunOutcome::Disabled;
        }

        let token = self.issue_cancellation(graph.cancellation());
        self.lock_status().message.clear();

        let node = Arc::clone(self);
        let ctx = NodeContext::new(Arc::clone(self), graph.clone(), token);
        let span = self.execution_span();
        graph.spawn(
            async move {
                let started = node.enter();
                if let Err(error) = node.behavior.on_start(&ctx).await {
                    node.report_error(&error);
                }
                node.leave(started);
            }
            .instrument(span),
        );

        RunOutcome::Started
    }

    /// Handles a payload delivered by `source` on one of this node's inputs.
    ///
    /// Failures, including a payload that is not JSON, are reported on this
    /// node's event channel and never returned to the dispatcher.
    pub async fn run_from_input(
        self: Arc<Self>,
        graph: Graph,
        source: Arc<Node>,
        payload: Arc<str>,
    ) {
        let span = self.execution_span();
        self.handle_input(graph, source, payload).instrument(span).await
    }

    async fn handle_input(self: Arc<Self>, graph: Graph, source: Arc<Node>, payload: Arc<str>) {
        if !self.header.enabled {
            InputDropped {
                node_id: &self.header.id,
                source_label: &source.label(),
            }
            .log();
            return;
        }

        let started = self.enter();
        match serde_json::from_str::<Value>(&payload) {
            Ok(value) => {
                let token = self.active_cancellation(graph.cancellation());
                let ctx = NodeContext::new(Arc::clone(&self), graph, token);
                if let Err(error) = self.behavior.on_input(&ctx, &source, value).await {
                    self.report_error(&error);
                }
            }
            Err(error) => self.report_error(&NodeError::PayloadParse {
                source_node: source.label(),
                error,
            }),
        }
        self.leave(started);
    }

    /// Fans `payload` out to every input connected to any output.
    ///
    /// Each edge is dispatched as its own task and is independently fallible:
    /// a peer id that no longer resolves is reported and skipped. Returns the
    /// number of edges dispatched.
    pub(crate) fn send_to_connected(
        self: &Arc<Self>,
        graph: &Graph,
        payload: &Value,
    ) -> usize {
        let serialized: Arc<str> = Arc::from(payload.to_string());
        let pretty = serde_json::to_string_pretty(payload).unwrap_or_else(|_| serialized.to_string());
        self.lock_status().last_output = Some(pretty);
        self.publish(NodeEvent::Output {
            node_id: self.header.id.clone(),
            payload: serialized.to_string(),
        });

        let mut dispatched = 0;
        for port in &self.outputs {
            for peer_id in port.peers().snapshot() {
                match graph.find_by_port_id(&peer_id) {
                    Ok(target) => {
                        graph.spawn(target.run_from_input(
                            graph.clone(),
                            Arc::clone(self),
                            Arc::clone(&serialized),
                        ));
                        dispatched += 1;
                    }
                    Err(_) => self.report_error(&NodeError::PortResolution {
                        output_id: port.id().to_string(),
                        peer_id,
                    }),
                }
            }
        }

        FanOutDispatched {
            node_id: &self.header.id,
            edges: dispatched,
            payload_size: serialized.len(),
        }
        .log();

        dispatched
    }

    pub(crate) fn report(&self, level: MessageLevel, text: String) {
        if level != MessageLevel::Debug {
            self.lock_status().message = text.clone();
        }

        NodeMessage {
            node_id: &self.header.id,
            node_label: &self.label(),
            level,
            text: &text,
        }
        .log();

        self.publish(NodeEvent::Message {
            node_id: self.header.id.clone(),
            level,
            text,
        });
    }

    pub(crate) fn report_error(&self, error: &NodeError) {
        self.report(MessageLevel::Error, error.to_string());
    }

    pub(crate) fn set_last_output(&self, text: String) {
        self.lock_status().last_output = Some(text);
    }

    pub(crate) fn set_progress(&self, percent: f64) {
        self.lock_status().progress = percent.clamp(0.0, 100.0);
    }

    /// Replaces the cancellation scope, cancelling the previous one.
    pub(crate) fn issue_cancellation(&self, parent: &CancellationToken) -> CancellationToken {
        let token = parent.child_token();
        let previous = self.lock_cancellation().replace(token.clone());
        if let Some(previous) = previous {
            previous.cancel();
        }
        token
    }

    /// The live cancellation scope, or a new one when none is live.
    pub(crate) fn active_cancellation(&self, parent: &CancellationToken) -> CancellationToken {
        let mut slot = self.lock_cancellation();
        match slot.as_ref() {
            Some(token) if !token.is_cancelled() => token.clone(),
            _ => {
                let token = parent.child_token();
                *slot = Some(token.clone());
                token
            }
        }
    }

    fn execution_span(&self) -> Span {
        NodeEntered {
            node_id: &self.header.id,
            node_label: &self.label(),
        }
        .span("node_execution")
    }

    fn enter(&self) -> Instant {
        NodeEntered {
            node_id: &self.header.id,
            node_label: &self.label(),
        }
        .log();
        self.publish(NodeEvent::Entered {
            node_id: self.header.id.clone(),
        });
        Instant::now()
    }

    fn leave(&self, started: Instant) {
        let elapsed = started.elapsed();
        NodeLeft {
            node_id: &self.header.id,
            elapsed,
        }
        .log();
        self.publish(NodeEvent::Left {
            node_id: self.header.id.clone(),
            elapsed,
        });
    }

    fn publish(&self, event: NodeEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    fn lock_status(&self) -> MutexGuard<'_, NodeStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_cancellation(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.cancellation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.header.id)
            .field("type_id", &self.header.type_id)
            .field("name", &self.header.name)
            .field("enabled", &self.header.enabled)
            .field("activate_on_start", &self.header.activate_on_start)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::port::PortPosition;
    use crate::nodes::stub::RecordingNode;

    fn shape(activate_on_start: bool, enabled: bool) -> NodeShape {
        NodeShape {
            header: NodeHeader {
                id: "n1".to_string(),
                type_id: "Recorder".to_string(),
                name: "recorder".to_string(),
                enabled,
                activate_on_start,
                position: NodePosition::new(10, 20),
            },
            inputs: vec![Port::new("Input 1", PortPosition::default())],
            outputs: vec![],
        }
    }

    fn node(activate_on_start: bool, enabled: bool) -> Arc<Node> {
        let (behavior, _log) = RecordingNode::new();
        Arc::new(Node::new(shape(activate_on_start, enabled), Box::new(behavior), 16))
    }

    #[test]
    fn test_reset_is_idempotent() {
        let node = node(false, true);
        node.set_progress(55.0);
        node.report(MessageLevel::Warning, "careful".to_string());

        node.reset();
        let once = node.status();
        node.reset();
        let twice = node.status();

        assert_eq!(once, twice);
        assert_eq!(once, NodeStatus::default());
    }

    #[test]
    fn test_progress_is_clamped() {
        let node = node(false, true);
        node.set_progress(250.0);
        assert_eq!(node.status().progress, 100.0);
        node.set_progress(-3.0);
        assert_eq!(node.status().progress, 0.0);
    }

    #[tokio::test]
    async fn test_run_without_activate_on_start_is_a_no_op() {
        let graph = Graph::new();
        let node = node(false, true);
        assert_eq!(node.run(&graph), RunOutcome::NotActivatedOnStart);
        assert!(!node.is_active());
    }

    #[tokio::test]
    async fn test_run_disabled_node_is_a_no_op() {
        let graph = Graph::new();
        let node = node(true, false);
        assert_eq!(node.run(&graph), RunOutcome::Disabled);
    }

    #[tokio::test]
    async fn test_new_run_supersedes_previous_scope() {
        let graph = Graph::new();
        let node = node(true, true);

        let first = node.issue_cancellation(graph.cancellation());
        let second = node.issue_cancellation(graph.cancellation());

        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(node.is_active());

        node.abort();
        assert!(second.is_cancelled());
        assert!(!node.is_active());
    }

    #[tokio::test]
    async fn test_invalid_json_input_is_reported_not_raised() {
        let graph = Graph::new();
        let source = node(true, true);
        let (behavior, log) = RecordingNode::new();
        let target = Arc::new(Node::new(shape(false, true), Box::new(behavior), 16));
        let mut events = target.subscribe();

        Arc::clone(&target)
            .run_from_input(graph, source, Arc::from("{not json"))
            .await;

        assert!(log.lock().unwrap().is_empty());
        assert!(target.status().message.contains("not valid JSON"));

        let mut saw_error = false;
        while let Ok(event) = events.try_recv() {
            if let NodeEvent::Message { level, .. } = event {
                saw_error |= level == MessageLevel::Error;
            }
        }
        assert!(saw_error);
    }

    /// Log output captured from a thread-local subscriber.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn lines(&self) -> Vec<String> {
            String::from_utf8_lossy(&self.0.lock().unwrap())
                .lines()
                .map(str::to_string)
                .collect()
        }
    }

    #[tokio::test]
    async fn test_execution_is_traced_inside_node_span() {
        let captured = CapturedLog::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let graph = Graph::new();
        let source = node(true, true);
        let (behavior, _log) = RecordingNode::new();
        let target = Arc::new(Node::new(shape(false, true), Box::new(behavior), 16));

        Arc::clone(&target)
            .run_from_input(graph.clone(), Arc::clone(&source), Arc::from("{\"a\":1}"))
            .await;
        source.run(&graph);
        graph.shutdown().await;

        let entered: Vec<String> = captured
            .lines()
            .into_iter()
            .filter(|line| line.contains("Entered"))
            .collect();
        assert_eq!(entered.len(), 2, "captured: {:?}", captured.lines());
        assert!(entered
            .iter()
            .all(|line| line.contains("node_execution") && line.contains("n1")));
    }

    #[tokio::test]
    async fn test_disabled_node_drops_input() {
        let graph = Graph::new();
        let source = node(true, true);
        let (behavior, log) = RecordingNode::new();
        let target = Arc::new(Node::new(shape(false, false), Box::new(behavior), 16));

        Arc::clone(&target)
            .run_from_input(graph, source, Arc::from("{\"a\":1}"))
            .await;

        assert!(log.lock().unwrap().is_empty());
    }
}
