// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::document::json::{select, JsonObjectExt};
use crate::engine::{Node, NodeContext};
use crate::errors::{ConstructionError, NodeError};
use crate::nodes::debug::optional_path;
use crate::registry::{NodeConstructors, NodeTypeDescriptor};
use crate::storage::KeyValueStore;
use crate::traits::{NodeBehavior, NodeTypeProvider};

pub const TYPE_ID: &str = "Store";

const DEFAULT_KEY: &str = "Value";

/// Writes each payload, or the part selected by `Path`, to the shared store.
///
/// Forwards `{"Key": k, "Value": new, "Previous": old}`; `Previous` is null
/// the first time a key is written.
pub struct StoreNode {
    key: String,
    path: Option<String>,
    store: Arc<KeyValueStore>,
}

impl StoreNode {
    pub fn new(
        key: impl Into<String>,
        path: Option<String>,
        store: Arc<KeyValueStore>,
    ) -> Result<Self, ConstructionError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConstructionError::InvalidField {
                field: "Key",
                reason: "must not be blank".to_string(),
            });
        }
        Ok(Self { key, path, store })
    }

    pub fn from_fields(
        fields: &Map<String, Value>,
        store: Arc<KeyValueStore>,
    ) -> Result<Self, ConstructionError> {
        let key = match fields.get_ignore_case("Key") {
            None | Some(Value::Null) => return Err(ConstructionError::MissingField("Key")),
            Some(Value::String(key)) => key.clone(),
            Some(other) => {
                return Err(ConstructionError::InvalidField {
                    field: "Key",
                    reason: format!("expected a string, found {}", other),
                })
            }
        };
        Self::new(key, optional_path(fields)?, store)
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl NodeBehavior for StoreNode {
    async fn on_input(&self, ctx: &NodeContext, source: &Node, payload: Value) -> Result<(), NodeError> {
        let Some(selected) = select(&payload, self.path.as_deref()) else {
            ctx.warn(format!(
                "Path '{}' not found in payload from {}; nothing stored",
                self.path.as_deref().unwrap_or_default(),
                source.label()
            ));
            return Ok(());
        };

        let previous = self.store.set_value(&self.key, selected)?;
        ctx.send(&json!({
            "Key": self.key,
            "Value": selected,
            "Previous": previous.unwrap_or(Value::Null),
        }));
        Ok(())
    }

    fn write_config(&self, fields: &mut Map<String, Value>) {
        fields.insert("Key".to_string(), Value::String(self.key.clone()));
        if let Some(path) = &self.path {
            fields.insert("Path".to_string(), Value::String(path.clone()));
        }
    }
}

pub struct StoreProvider;

impl NodeTypeProvider for StoreProvider {
    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(TYPE_ID, "Storage")
            .with_display_name("Store")
            .with_ports(1, 1)
            .with_overview("The Store node keeps a value in the shared key-value store")
    }

    fn constructors(&self) -> NodeConstructors {
        NodeConstructors::new(
            |_shape, services| {
                let store = services.require_store()?;
                Ok(Box::new(StoreNode::new(DEFAULT_KEY, None, store)?) as Box<dyn NodeBehavior>)
            },
            |_shape, fields, services| {
                let store = services.require_store()?;
                Ok(Box::new(StoreNode::from_fields(fields, store)?) as Box<dyn NodeBehavior>)
            },
        )
    }
}
