// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::document::json::{select, to_pretty, JsonObjectExt};
use crate::engine::{Node, NodeContext};
use crate::errors::{ConstructionError, NodeError};
use crate::registry::{NodeConstructors, NodeTypeDescriptor};
use crate::traits::{NodeBehavior, NodeTypeProvider};

pub const TYPE_ID: &str = "Debug";

/// Shows the payload it receives, or the part of it selected by `Path`.
pub struct DebugNode {
    path: Option<String>,
}

impl DebugNode {
    pub fn new(path: Option<String>) -> Self {
        Self {
            path: path.filter(|p| !p.trim().is_empty()),
        }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ConstructionError> {
        Ok(Self::new(optional_path(fields)?))
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

#[async_trait]
impl NodeBehavior for DebugNode {
    async fn on_input(&self, ctx: &NodeContext, source: &Node, payload: Value) -> Result<(), NodeError> {
        match select(&payload, self.path()) {
            Some(selected) => {
                let text = to_pretty(selected);
                ctx.record_output(text.clone());
                ctx.info(text);
            }
            None => ctx.warn(format!(
                "Path '{}' not found in payload from {}",
                self.path().unwrap_or_default(),
                source.label()
            )),
        }
        Ok(())
    }

    fn write_config(&self, fields: &mut Map<String, Value>) {
        if let Some(path) = &self.path {
            fields.insert("Path".to_string(), Value::String(path.clone()));
        }
    }
}

/// Reads the optional `Path` field shared by Debug and Store.
pub(crate) fn optional_path(fields: &Map<String, Value>) -> Result<Option<String>, ConstructionError> {
    match fields.get_ignore_case("Path") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(path)) => Ok(Some(path.clone()).filter(|p| !p.trim().is_empty())),
        Some(other) => Err(ConstructionError::InvalidField {
            field: "Path",
            reason: format!("expected a dotted path string, found {}", other),
        }),
    }
}

pub struct DebugProvider;

impl NodeTypeProvider for DebugProvider {
    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(TYPE_ID, "Core")
            .with_display_name("Debug")
            .with_ports(1, 0)
            .with_overview("The Debug node shows the payload it receives, or one value selected by a path")
    }

    fn constructors(&self) -> NodeConstructors {
        NodeConstructors::new(
            |_shape, _services| Ok(Box::new(DebugNode::new(None)) as Box<dyn NodeBehavior>),
            |_shape, fields, _services| {
                Ok(Box::new(DebugNode::from_fields(fields)?) as Box<dyn NodeBehavior>)
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blank_path_means_whole_payload() {
        let node = DebugNode::from_fields(json!({"Path": "  "}).as_object().unwrap()).unwrap();
        assert_eq!(node.path(), None);
    }

    #[test]
    fn test_non_string_path_is_rejected() {
        let result = DebugNode::from_fields(json!({"Path": 3}).as_object().unwrap());
        assert!(matches!(
            result,
            Err(ConstructionError::InvalidField { field: "Path", .. })
        ));
    }

    #[test]
    fn test_write_config_only_writes_set_path() {
        let mut fields = Map::new();
        DebugNode::new(None).write_config(&mut fields);
        assert!(fields.is_empty());

        DebugNode::new(Some("a.b".to_string())).write_config(&mut fields);
        assert_eq!(fields.get("Path"), Some(&json!("a.b")));
    }
}
