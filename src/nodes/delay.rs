// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::engine::periodic::delay_with_progress;
use crate::engine::{Node, NodeContext};
use crate::errors::{ConstructionError, NodeError};
use crate::nodes::timing::Interval;
use crate::registry::{NodeConstructors, NodeTypeDescriptor};
use crate::traits::{NodeBehavior, NodeTypeProvider};

pub const TYPE_ID: &str = "Delay";

/// Holds each payload for a fixed time, then forwards it unchanged.
pub struct DelayNode {
    delay: Interval,
}

impl DelayNode {
    pub fn new(delay: Interval) -> Self {
        Self { delay }
    }

    pub fn from_fields(fields: &Map<String, Value>) -> Result<Self, ConstructionError> {
        Ok(Self::new(Interval::from_field(fields, "Delay")?))
    }

    pub fn delay(&self) -> Interval {
        self.delay
    }
}

#[async_trait]
impl NodeBehavior for DelayNode {
    async fn on_input(&self, ctx: &NodeContext, _source: &Node, payload: Value) -> Result<(), NodeError> {
        // Cancelled while waiting: the payload is dropped.
        if delay_with_progress(ctx, self.delay.duration()).await {
            ctx.send(&payload);
        }
        Ok(())
    }

    fn write_config(&self, fields: &mut Map<String, Value>) {
        fields.insert("Delay".to_string(), self.delay.to_json());
    }
}

pub struct DelayProvider;

impl NodeTypeProvider for DelayProvider {
    fn descriptor(&self) -> NodeTypeDescriptor {
        NodeTypeDescriptor::new(TYPE_ID, "Function")
            .with_display_name("Delay")
            .with_ports(1, 1)
            .with_overview("The Delay node waits a fixed time before passing each payload on")
    }

    fn constructors(&self) -> NodeConstructors {
        NodeConstructors::new(
            |_shape, _services| {
                Ok(Box::new(DelayNode::new(Interval::seconds(1))) as Box<dyn NodeBehavior>)
            },
            |_shape, fields, _services| {
                Ok(Box::new(DelayNode::from_fields(fields)?) as Box<dyn NodeBehavior>)
            },
        )
    }
}
