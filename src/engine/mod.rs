// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod events;
pub mod factory;
pub mod graph;
pub mod node;
pub mod periodic;
pub mod port;
#[cfg(test)]
pub mod integration_tests;

pub use context::NodeContext;
pub use events::{MessageLevel, NodeEvent};
pub use factory::{NodeFactory, NodeServices};
pub use graph::Graph;
pub use node::{Node, NodeHeader, NodePosition, NodeShape, NodeStatus, RunOutcome};
pub use port::{Port, PortPosition};
