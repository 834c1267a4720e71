// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inject: starts a flow with a payload of named parameters, once or on a repeat.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::time::{self, MissedTickBehavior};

use crate::document::json::JsonObjectExt;
use crate::engine::periodic::delay_with_progress;
use crate::engine::{Node, NodeContext, Port, PortPosition};
use crate::errors::{ConstructionError, NodeError};
use crate::nodes::parameter::Parameter;
use crate::nodes::timing::Interval;
use crate::observability::messages::{node::RepeatStopped, StructuredLog};
use crate::registry::{NodeConstructors, NodeTypeDescriptor};
use crate::traits::{EnvironmentSource, NodeBehavior, NodeTypeProvider};

pub const TYPE_ID: &str = "Inject";

/// Configuration of an Inject node.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectConfig {
    pub repeat: Interval,
    pub activate_after: Interval,
    pub parameters: Vec<Parameter>,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            repeat: Interval::seconds(10),
            activate_after: Interval::seconds(1),
            parameters: vec![Parameter::timestamp("Timestamp")],
        }
    }
}

impl InjectConfig {
    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ConstructionError> {
        let repeat = Interval::from_field(fields, "Repeat")?;
        let activate_after = Interval::from_field(fields, "ActivateAfter")?;

        let parameters = match fields.get_ignore_case("Parameters") {
            None | Some(Value::Null) => return Err(ConstructionError::MissingField("Parameters")),
            Some(Value::Array(entries)) => entries
                .iter()
                .map(Parameter::from_json)
                .collect::<Result<_, _>>()?,
            Some(other) => {
                return Err(ConstructionError::InvalidField {
                    field: "Parameters",
                    reason: format!("expected an array, found {}", other),
                })
            }
        };

        Ok(Self {
            repeat,
            activate_after,
            parameters,
        })
    }

    pub fn write(&self, fields: &mut Map<String, Value>) {
        fields.insert("Repeat".to_string(), self.repeat.to_json());
        fields.insert("ActivateAfter".to_string(), self.activate_after.to_json());
        fields.insert(
            "Parameters".to_string(),
            Value::Array(self.parameters.iter().map(Parameter::to_json).collect()),
        );
    }
}

pub struct InjectNode {
    config: InjectConfig,
    environment: Arc<dyn EnvironmentSource>,
}

impl InjectNode {
    pub fn new(config: InjectConfig, environment: Arc<dyn EnvironmentSource>) -> Self {
        Self {
            config,
            environment,
        }
    }

    pub fn config(&self) -> &InjectConfig {
        &self.config
    }

    /// Builds one `{"Parameters": [...]}` payload and the warnings raised building it.
    pub fn produce(&self, now_millis: i64) -> Result<(Value, Vec<String>), NodeError> {
        let mut entries = Vec::with_capacity(self.config.parameters.len());
        let mut warnings = Vec::new();

        for parameter in &self.config.parameters {
            let resolved = parameter.resolve(self.environment.as_ref(), now_millis)?;
            warnings.extend(resolved.warning);

            let mut entry = Map::new();
            entry.insert(parameter.name.clone(), resolved.value);
            entries.push(Value::Object(entry));
        }

        Ok((json!({ "Parameters": entries }), warnings))
    }

    fn cycle(&self, ctx: &NodeContext) -> Result<(), NodeError> {
        let (payload, warnings) = self.produce(chrono::Utc::now().timestamp_millis())?;
        for warning in warnings {
            ctx.warn(warning);
        }
        if !ctx.is_cancelled() {
            ctx.send(&payload);
        }
        Ok(())
    }
}

#[async_trait]
impl NodeBehavior for InjectNode {
    async fn on_start(&self, ctx: &NodeContext) -> Result<(), NodeError> {
        if self.config.activate_after.is_enabled()
            && !delay_with_progress(ctx, self.config.activate_after.duration()).await
        {
            return Ok(());
        }

        if !self.config.repeat.is_enabled() {
            return self.cycle(ctx);
        }

        let mut ticker = time::interval(self.config.repeat.duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = ctx.cancellation().cancelled() => break,
                _ = ticker.tick() => {}
            }

            // A failed cycle does not end the repeat.
            if let Err(error) = self.cycle(ctx) {
                ctx.report_error(&error);
            }
            cycles += 1;
        }

        RepeatStopped {
            node_id: ctx.node().id(),
            cycles,
        }
        .log();
        Ok(())
    }

    async fn on_input(&self, ctx: &NodeContext, _source: &Node, _payload: Value) -> Result<(), NodeError> {
        self.cycle(ctx)
    }

    fn write_config(&self, fields: &mut Map<String, Value>) {
        self.config.write(fields);
    }
}

pub struct InjectProvider;

impl NodeTypeProvider for InjectProvider {
    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(TYPE_ID, "Core")
            .with_display_name("Inject")
            .with_ports(0, 1)
            .activating_on_start(true)
            .with_overview("The Inject node can initiate a flow with a specific payload value")
    }

    fn constructors(&self) -> NodeConstructors {
        NodeConstructors::new(
            |shape, services| {
                shape.inputs.clear();
                shape.outputs = vec![Port::new("Output", PortPosition::default())];
                Ok(Box::new(InjectNode::new(
                    InjectConfig::default(),
                    Arc::clone(&services.environment),
                )) as Box<dyn NodeBehavior>)
            },
            |_shape, fields, services| {
                let config = InjectConfig::from_fields(fields)?;
                Ok(Box::new(InjectNode::new(config, Arc::clone(&services.environment)))
                    as Box<dyn NodeBehavior>)
            },
        )
    }
}
