// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod document;
mod graph;
mod node;
mod store;
mod validation;

pub use config::ConfigError;
pub use document::DocumentError;
pub use graph::{GraphError, RegistryError};
pub use node::{ConstructionError, NodeCreationError, NodeError};
pub use store::StoreError;
pub use validation::ValidationError;
