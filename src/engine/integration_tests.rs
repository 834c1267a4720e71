// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::{sleep, timeout, Instant};
use uuid::Uuid;

use crate::config::{NodeFlowSettings, Runtime, RuntimeBuilder};
use crate::engine::{Graph, MessageLevel, NodeEvent, Port, PortPosition};
use crate::nodes::stub::{EmitterNode, RecordLog, RecordingNode};
use crate::traits::EnvironmentSource;

/// Environment variables a test can change while a flow runs.
#[derive(Default)]
struct SharedEnvironment(Mutex<HashMap<String, String>>);

impl SharedEnvironment {
    fn set(&self, name: &str, value: &str) {
        self.0.lock().unwrap().insert(name.to_string(), value.to_string());
    }
}

impl EnvironmentSource for SharedEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        self.0.lock().unwrap().get(name).cloned()
    }
}

/// A runtime whose registry also knows the `Recorder` recording type.
fn runtime_with_recorder(environment: Arc<SharedEnvironment>) -> (Runtime, RecordLog) {
    let (recorder, log) = RecordingNode::provider("Recorder");
    let runtime = RuntimeBuilder::new(NodeFlowSettings::default())
        .with_provider(Box::new(recorder))
        .with_environment(environment)
        .build()
        .unwrap();
    (runtime, log)
}

fn port_id() -> String {
    Uuid::now_v7().to_string()
}

fn interval(unit: &str, value: u64) -> Value {
    json!({"Type": unit, "Value": value})
}

fn inject(id: &str, repeat: Value, parameters: Value, targets: &[&str]) -> Value {
    json!({
        "Id": id, "TypeId": "Inject", "Name": id, "ActivateOnStart": true,
        "Repeat": repeat,
        "ActivateAfter": interval("Second", 0),
        "Parameters": parameters,
        "Outputs": [{"Id": port_id(), "Name": "Output", "connectsToNodeId": targets}],
    })
}

fn delay(id: &str, millis: u64, input: &str, targets: &[&str]) -> Value {
    json!({
        "Id": id, "TypeId": "Delay", "Name": id,
        "Delay": interval("Millisecond", millis),
        "Inputs": [{"Id": input, "Name": "Input 1"}],
        "Outputs": [{"Id": port_id(), "Name": "Output 1", "connectsToNodeId": targets}],
    })
}

fn sink(id: &str, type_id: &str, input: &str) -> Value {
    json!({
        "Id": id, "TypeId": type_id, "Name": id,
        "Inputs": [{"Id": input, "Name": "Input 1"}],
    })
}

fn load(runtime: &Runtime, nodes: Vec<Value>) -> Graph {
    runtime
        .codec
        .load(json!({ "Nodes": nodes }).to_string().as_bytes())
        .unwrap()
}

fn recorded(log: &RecordLog) -> Vec<(String, Value)> {
    log.lock().unwrap().clone()
}

async fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    condition()
}

fn drain(receiver: &mut tokio::sync::broadcast::Receiver<NodeEvent>) -> Vec<NodeEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

/// Integration tests running whole flows through the graph
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fan_out_reaches_every_connected_input_once() {
        let graph = Graph::new();
        let mut targets = Vec::new();
        let mut logs = Vec::new();
        for id in ["a", "b", "c"] {
            let (node, log) = RecordingNode::recorder(id);
            targets.push(node.inputs()[0].id().to_string());
            logs.push(log);
            graph.add(node).unwrap();
        }
        graph
            .add(EmitterNode::node("source", json!({"n": 1}), targets))
            .unwrap();

        assert_eq!(graph.run(), 1);
        assert!(wait_until(Duration::from_secs(2), || logs.iter().all(|l| !recorded(l).is_empty())).await);
        sleep(Duration::from_millis(50)).await;

        for log in &logs {
            assert_eq!(recorded(log), vec![("source".to_string(), json!({"n": 1}))]);
        }
        graph.shutdown().await;
    }

    #[tokio::test]
    async fn test_unresolved_peer_is_reported_and_sibling_still_runs() {
        let graph = Graph::new();
        let (sibling, log) = RecordingNode::recorder("sibling");
        let dangling = port_id();
        let source = EmitterNode::node(
            "source",
            json!("payload"),
            vec![dangling.clone(), sibling.inputs()[0].id().to_string()],
        );
        graph.add(sibling).unwrap();
        graph.add(Arc::clone(&source)).unwrap();

        let mut events = source.subscribe();
        graph.run();
        assert!(wait_until(Duration::from_secs(2), || !recorded(&log).is_empty()).await);
        graph.shutdown().await;

        let errors: Vec<String> = drain(&mut events)
            .into_iter()
            .filter_map(|event| match event {
                NodeEvent::Message {
                    level: MessageLevel::Error,
                    text,
                    ..
                } => Some(text),
                _ => None,
            })
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains(&dangling));
        assert!(source.status().message.contains(&dangling));
    }

    #[tokio::test]
    async fn test_removed_node_no_longer_receives_or_resolves() {
        let graph = Graph::new();
        let (kept, kept_log) = RecordingNode::recorder("kept");
        let (removed, removed_log) = RecordingNode::recorder("removed");
        let removed_input = removed.inputs()[0].id().to_string();
        let source = EmitterNode::node(
            "source",
            json!(7),
            vec![kept.inputs()[0].id().to_string(), removed_input.clone()],
        );
        for node in [kept, removed, Arc::clone(&source)] {
            graph.add(node).unwrap();
        }

        graph.remove("removed").unwrap();
        assert!(graph.find_by_port_id(&removed_input).is_err());
        assert_eq!(source.outputs()[0].peers().len(), 1);

        graph.run();
        assert!(wait_until(Duration::from_secs(2), || !recorded(&kept_log).is_empty()).await);
        graph.shutdown().await;

        assert!(recorded(&removed_log).is_empty());
        assert!(source.status().message.is_empty());
    }

    #[tokio::test]
    async fn test_run_starts_only_enabled_roots() {
        let (runtime, _log) = runtime_with_recorder(Arc::default());
        let once = interval("Second", 0);
        let mut disabled = inject("off", once.clone(), json!([]), &[]);
        disabled["IsEnabled"] = json!(false);

        let graph = load(
            &runtime,
            vec![
                inject("on", once, json!([]), &[]),
                disabled,
                sink("show", "Debug", &port_id()),
            ],
        );

        assert_eq!(graph.run(), 1);
        graph.shutdown().await;
    }

    #[tokio::test]
    async fn test_repeat_emits_until_aborted() {
        let (runtime, log) = runtime_with_recorder(Arc::default());
        let input = port_id();
        let graph = load(
            &runtime,
            vec![
                inject("tick", interval("Second", 1), json!([{"Name": "n", "Value": "x"}]), &[&input]),
                sink("recorder", "Recorder", &input),
            ],
        );

        graph.run();
        sleep(Duration::from_millis(2500)).await;
        assert!(recorded(&log).len() >= 2);

        graph.get("tick").unwrap().abort();
        let after_abort = recorded(&log).len();

        sleep(Duration::from_millis(1100)).await;
        assert_eq!(recorded(&log).len(), after_abort);
        graph.shutdown().await;
    }

    #[tokio::test]
    async fn test_activate_after_waits_with_progress_before_producing() {
        let (runtime, log) = runtime_with_recorder(Arc::default());
        let input = port_id();
        let mut delayed = inject("late", interval("Second", 0), json!([{"Name": "n", "Value": "x"}]), &[&input]);
        delayed["ActivateAfter"] = interval("Millisecond", 600);
        let graph = load(&runtime, vec![delayed, sink("recorder", "Recorder", &input)]);
        let late = graph.get("late").unwrap();

        let started = Instant::now();
        graph.run();
        sleep(Duration::from_millis(300)).await;

        assert!(recorded(&log).is_empty());
        let progress = late.status().progress;
        assert!(progress > 0.0 && progress < 100.0, "progress was {}", progress);

        assert!(wait_until(Duration::from_secs(2), || !recorded(&log).is_empty()).await);
        assert!(started.elapsed() >= Duration::from_millis(600));
        graph.shutdown().await;
        assert_eq!(recorded(&log).len(), 1);
    }

    #[tokio::test]
    async fn test_abort_during_activate_after_stops_silently() {
        let (runtime, log) = runtime_with_recorder(Arc::default());
        let input = port_id();
        let mut delayed = inject("late", interval("Second", 0), json!([]), &[&input]);
        delayed["ActivateAfter"] = interval("Millisecond", 400);
        let graph = load(&runtime, vec![delayed, sink("recorder", "Recorder", &input)]);
        let late = graph.get("late").unwrap();
        let mut events = late.subscribe();

        graph.run();
        assert!(wait_until(Duration::from_secs(1), || late.is_active()).await);
        late.abort();

        sleep(Duration::from_millis(1000)).await;
        assert!(recorded(&log).is_empty());
        assert!(late.status().message.is_empty());
        assert!(!drain(&mut events)
            .iter()
            .any(|event| matches!(event, NodeEvent::Message { .. } | NodeEvent::Output { .. })));
        graph.shutdown().await;
    }

    #[tokio::test]
    async fn test_environment_parameter_errors_until_variable_is_set() {
        let environment = Arc::new(SharedEnvironment::default());
        let (runtime, log) = runtime_with_recorder(Arc::clone(&environment));
        let input = port_id();
        let graph = load(
            &runtime,
            vec![
                inject(
                    "env",
                    interval("Millisecond", 200),
                    json!([{"Name": "Answer", "Source": "environment", "Value": "NODEFLOW_ANSWER"}]),
                    &[&input],
                ),
                sink("recorder", "Recorder", &input),
            ],
        );
        let inject_node = graph.get("env").unwrap();
        let mut events = inject_node.subscribe();

        graph.run();
        assert!(
            wait_until(Duration::from_secs(2), || inject_node
                .status()
                .message
                .contains("NODEFLOW_ANSWER"))
            .await
        );
        assert!(recorded(&log).is_empty());
        assert!(drain(&mut events).iter().any(|event| matches!(
            event,
            NodeEvent::Message { level: MessageLevel::Error, .. }
        )));

        environment.set("NODEFLOW_ANSWER", "42");
        assert!(wait_until(Duration::from_secs(2), || !recorded(&log).is_empty()).await);
        graph.shutdown().await;

        assert_eq!(recorded(&log)[0].1, json!({"Parameters": [{"Answer": 42}]}));
    }

    #[tokio::test]
    async fn test_delay_chain_delivers_to_debug_and_recorder() {
        let (runtime, log) = runtime_with_recorder(Arc::default());
        let delay_input = port_id();
        let debug_input = port_id();
        let recorder_input = port_id();
        let graph = load(
            &runtime,
            vec![
                inject(
                    "start",
                    interval("Second", 0),
                    json!([{"Name": "Greeting", "Value": "hi"}]),
                    &[&delay_input],
                ),
                delay("wait", 50, &delay_input, &[&debug_input, &recorder_input]),
                sink("show", "Debug", &debug_input),
                sink("recorder", "Recorder", &recorder_input),
            ],
        );
        let debug = graph.get("show").unwrap();
        let mut debug_events = debug.subscribe();

        let started = Instant::now();
        graph.run();
        assert!(wait_until(Duration::from_secs(2), || !recorded(&log).is_empty()
            && debug.status().last_output.is_some())
        .await);
        assert!(started.elapsed() >= Duration::from_millis(50));
        graph.shutdown().await;

        let expected = json!({"Parameters": [{"Greeting": "hi"}]});
        assert_eq!(recorded(&log), vec![("wait".to_string(), expected.clone())]);
        assert_eq!(graph.get("wait").unwrap().status().progress, 100.0);

        let events = drain(&mut debug_events);
        assert!(matches!(events.first(), Some(NodeEvent::Entered { .. })));
        assert!(events.iter().any(|event| matches!(
            event,
            NodeEvent::Message { level: MessageLevel::Info, text, .. } if text.contains("Greeting")
        )));
        assert!(matches!(events.last(), Some(NodeEvent::Left { .. })));
    }

    #[tokio::test]
    async fn test_shutdown_cancels_waits_and_drains_tasks() {
        let (runtime, log) = runtime_with_recorder(Arc::default());
        let delay_input = port_id();
        let recorder_input = port_id();
        let graph = load(
            &runtime,
            vec![
                inject("start", interval("Second", 0), json!([]), &[&delay_input]),
                delay("wait", 10_000, &delay_input, &[&recorder_input]),
                sink("recorder", "Recorder", &recorder_input),
            ],
        );

        graph.run();
        let wait = graph.get("wait").unwrap();
        assert!(wait_until(Duration::from_secs(2), || wait.is_active()).await);

        timeout(Duration::from_secs(2), graph.shutdown())
            .await
            .expect("shutdown should not wait for the delay");

        assert_eq!(graph.active_tasks(), 0);
        assert!(recorded(&log).is_empty());
    }

    #[tokio::test]
    async fn test_connect_at_runtime_wires_new_edge() {
        let graph = Graph::new();
        let (sink_node, log) = RecordingNode::recorder("sink");
        let sink_input = sink_node.inputs()[0].id();
        let source = EmitterNode::node("source", json!(true), vec![]);
        graph.add(sink_node).unwrap();
        graph.add(Arc::clone(&source)).unwrap();

        assert!(graph.connect(source.outputs()[0].id(), sink_input).unwrap());
        assert!(!graph.connect(source.outputs()[0].id(), sink_input).unwrap());

        graph.run();
        assert!(wait_until(Duration::from_secs(2), || !recorded(&log).is_empty()).await);
        graph.shutdown().await;
        assert_eq!(recorded(&log).len(), 1);

        let input = Port::new("Input 9", PortPosition::default());
        assert!(graph.connect(source.outputs()[0].id(), input.id()).is_err());
    }
}
