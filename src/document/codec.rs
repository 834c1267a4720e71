// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Reads and writes graph documents.
//!
//! A document is `{"Nodes": [...]}` where each entry carries the common node
//! fields, its `Outputs` and `Inputs`, and whatever type-specific fields the
//! node's behaviour writes. Loading builds a fresh [`Graph`] node by node and
//! returns it only once every node is built and the port references pass
//! [`validate_graph`]; any failure drops the partial graph.

use serde_json::{json, Map, Value};
use std::io::{Read, Write};
use std::path::Path;
use uuid::Uuid;

use crate::config::consts::{DEFAULT_NODE_X, DEFAULT_NODE_Y};
use crate::document::json::JsonObjectExt;
use crate::document::validation::validate_graph;
use crate::engine::{Graph, Node, NodeFactory, NodeHeader, NodePosition, Port, PortPosition};
use crate::errors::{DocumentError, NodeCreationError};
use crate::observability::messages::{document::*, StructuredLog};
use crate::utils::write_atomically;

const OUTPUT_PEERS: &str = "connectsToNodeId";
const INPUT_PEERS: &str = "ConnectsToParentNodeId";

/// Converts between live graphs and their JSON documents.
#[derive(Clone, Debug)]
pub struct GraphCodec {
    factory: NodeFactory,
}

impl GraphCodec {
    pub fn new(factory: NodeFactory) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &NodeFactory {
        &self.factory
    }

    /// The whole document as a JSON value, nodes in insertion order.
    pub fn to_document(&self, graph: &Graph) -> Value {
        let nodes: Vec<Value> = graph.nodes().iter().map(|node| node_to_json(node)).collect();
        json!({ "Nodes": nodes })
    }

    /// Serializes `graph` to pretty-printed JSON.
    pub fn save(&self, graph: &Graph) -> Result<Vec<u8>, DocumentError> {
        let document = self.to_document(graph);
        let bytes = serde_json::to_vec_pretty(&document)?;
        DocumentSaved {
            nodes: graph.len(),
            bytes: bytes.len(),
        }
        .log();
        Ok(bytes)
    }

    pub fn save_to_writer<W: Write>(&self, graph: &Graph, mut writer: W) -> Result<(), DocumentError> {
        let bytes = self.save(graph)?;
        writer.write_all(&bytes).map_err(DocumentError::Stream)?;
        writer.flush().map_err(DocumentError::Stream)
    }

    /// Writes the document to `path`, replacing any existing file atomically.
    pub fn save_to_path(&self, graph: &Graph, path: impl AsRef<Path>) -> Result<(), DocumentError> {
        let path = path.as_ref();
        let bytes = self.save(graph)?;
        write_atomically(path, &bytes).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds a new graph from a document.
    pub fn load(&self, bytes: &[u8]) -> Result<Graph, DocumentError> {
        let document: Value = serde_json::from_slice(bytes)?;
        let entries = document
            .get("Nodes")
            .and_then(Value::as_array)
            .ok_or(DocumentError::MissingNodes)?;

        let graph = Graph::new();
        for (index, entry) in entries.iter().enumerate() {
            let node = self.node_from_json(index, entry)?;
            graph.add(node)?;
        }

        let warnings = validate_graph(&graph).map_err(DocumentError::Validation)?;
        for warning in &warnings {
            ParentUnresolved {
                node_id: &warning.node_id,
                port_id: &warning.port_id,
                parent_id: &warning.parent_id,
            }
            .log();
        }

        DocumentLoaded {
            nodes: graph.len(),
            warnings: warnings.len(),
        }
        .log();
        Ok(graph)
    }

    pub fn load_from_reader<R: Read>(&self, mut reader: R) -> Result<Graph, DocumentError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(DocumentError::Stream)?;
        self.load(&bytes)
    }

    pub fn load_from_path(&self, path: impl AsRef<Path>) -> Result<Graph, DocumentError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&bytes)
    }

    fn node_from_json(&self, index: usize, entry: &Value) -> Result<std::sync::Arc<Node>, DocumentError> {
        let fields = entry.as_object().ok_or_else(|| DocumentError::MalformedNode {
            index,
            node_id: None,
            field: "Nodes",
            detail: format!("expected an object, found {}", entry),
        })?;

        let id = required_str(fields, "Id", index, None)?;
        let type_id = required_str(fields, "TypeId", index, Some(&id))?;
        let name = required_str(fields, "Name", index, Some(&id))?;

        let descriptor = self
            .factory
            .descriptor(&type_id)
            .map_err(|_| DocumentError::TypeResolution {
                node_id: id.clone(),
                type_id: type_id.clone(),
            })?;

        let enabled = match enabled_flag(fields) {
            Some((_, Value::Bool(enabled))) => *enabled,
            Some((field, other)) => {
                return Err(DocumentError::MalformedNode {
                    index,
                    node_id: Some(id),
                    field,
                    detail: format!("expected a boolean, found {}", other),
                })
            }
            None => descriptor.enabled,
        };

        let header = NodeHeader {
            activate_on_start: matches!(fields.get("ActivateOnStart"), Some(Value::Bool(true))),
            position: NodePosition::new(
                coordinate(fields.get("X"), DEFAULT_NODE_X),
                coordinate(fields.get("Y"), DEFAULT_NODE_Y),
            ),
            id,
            type_id,
            name,
            enabled,
        };

        let outputs = ports_from_json(fields.get_ignore_case("Outputs"), OUTPUT_PEERS);
        let inputs = ports_from_json(fields.get_ignore_case("Inputs"), INPUT_PEERS);

        self.factory
            .create_from_document(header, outputs, inputs, fields)
            .map_err(|error| match error {
                NodeCreationError::TypeResolution(_) => DocumentError::TypeResolution {
                    node_id: fields_id(fields),
                    type_id: fields_type(fields),
                },
                NodeCreationError::Construction {
                    node_id,
                    type_id,
                    source,
                } => DocumentError::Construction {
                    node_id,
                    type_id,
                    source,
                },
            })
    }
}

fn required_str(
    fields: &Map<String, Value>,
    field: &'static str,
    index: usize,
    node_id: Option<&str>,
) -> Result<String, DocumentError> {
    let malformed = |detail: String| DocumentError::MalformedNode {
        index,
        node_id: node_id.map(str::to_string),
        field,
        detail,
    };

    match fields.get(field) {
        None | Some(Value::Null) => Err(malformed("is required".to_string())),
        Some(Value::String(text)) if text.is_empty() => Err(malformed("must not be empty".to_string())),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(malformed(format!("expected a string, found {}", other))),
    }
}

fn fields_id(fields: &Map<String, Value>) -> String {
    fields.get("Id").and_then(Value::as_str).unwrap_or_default().to_string()
}

fn fields_type(fields: &Map<String, Value>) -> String {
    fields.get("TypeId").and_then(Value::as_str).unwrap_or_default().to_string()
}

/// `IsEnabled`, else the older `Enabled`, with the name of the field found.
fn enabled_flag(fields: &Map<String, Value>) -> Option<(&'static str, &Value)> {
    fields
        .get("IsEnabled")
        .map(|value| ("IsEnabled", value))
        .or_else(|| fields.get("Enabled").map(|value| ("Enabled", value)))
}

fn coordinate(value: Option<&Value>, default: i32) -> i32 {
    value
        .and_then(|value| {
            value
                .as_i64()
                .or_else(|| value.as_f64().map(|f| f.trunc() as i64))
        })
        .and_then(|n| i32::try_from(n).ok())
        .unwrap_or(default)
}

fn ports_from_json(value: Option<&Value>, peers_field: &str) -> Vec<Port> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    let empty = Map::new();
    entries
        .iter()
        .map(|entry| {
            let fields = entry.as_object().unwrap_or(&empty);

            let id = fields
                .str_ignore_case("Id")
                .and_then(|id| Uuid::parse_str(id).ok())
                .unwrap_or_else(Uuid::now_v7);
            let name = fields.str_ignore_case("Name").unwrap_or_default();
            let peers = match fields.get_ignore_case(peers_field) {
                Some(Value::Array(peers)) => peers
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            };

            Port::with_id(id, name, peers, port_position(fields))
        })
        .collect()
}

fn port_position(fields: &Map<String, Value>) -> PortPosition {
    let source = match fields.get_ignore_case("StartPosition") {
        Some(Value::Object(start)) => start,
        _ => fields,
    };
    PortPosition::new(
        source.f64_ignore_case("X").unwrap_or(0.0),
        source.f64_ignore_case("Y").unwrap_or(0.0),
    )
}

fn node_to_json(node: &Node) -> Value {
    // Type fields go in first so the common fields always win.
    let mut fields = Map::new();
    node.behavior().write_config(&mut fields);

    let header = node.header();
    fields.insert("Id".to_string(), json!(header.id));
    fields.insert("TypeId".to_string(), json!(header.type_id));
    fields.insert("Name".to_string(), json!(header.name));
    fields.insert("X".to_string(), json!(header.position.x));
    fields.insert("Y".to_string(), json!(header.position.y));
    fields.insert("IsEnabled".to_string(), json!(header.enabled));
    fields.insert("ActivateOnStart".to_string(), json!(header.activate_on_start));
    fields.insert("Outputs".to_string(), ports_to_json(node.outputs(), OUTPUT_PEERS));
    fields.insert("Inputs".to_string(), ports_to_json(node.inputs(), INPUT_PEERS));

    Value::Object(fields)
}

fn ports_to_json(ports: &[Port], peers_field: &str) -> Value {
    ports
        .iter()
        .map(|port| {
            let position = port.position();
            let mut entry = Map::new();
            entry.insert("Id".to_string(), json!(port.id().to_string()));
            entry.insert("Name".to_string(), json!(port.name()));
            entry.insert(peers_field.to_string(), json!(port.peers().snapshot()));
            entry.insert("X".to_string(), json!(position.x));
            entry.insert("Y".to_string(), json!(position.y));
            Value::Object(entry)
        })
        .collect()
}
