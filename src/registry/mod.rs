// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node type registry.
//!
//! Maps a type id to its [`NodeTypeDescriptor`] and to two explicit
//! constructors: one for nodes created fresh (ports allocated from the
//! descriptor) and one for nodes rebuilt from a graph document (ports and
//! configuration taken from the document).
//!
//! The registry is populated once, before any graph operation, either by
//! calling [`NodeTypeRegistry::register`] directly or by running
//! [`NodeTypeRegistry::discover`] over a declared set of providers.
//!
//! # Example
//! ```
//! use nodeflow::registry::NodeTypeRegistry;
//!
//! let registry = NodeTypeRegistry::with_builtin_types().unwrap();
//! assert!(registry.contains("Inject"));
//! assert!(registry.resolve("Nope").is_err());
//! ```

mod descriptor;

pub use descriptor::NodeTypeDescriptor;

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::{NodeServices, NodeShape};
use crate::errors::{ConstructionError, RegistryError};
use crate::observability::messages::{registry::NodeTypeRegistered, StructuredLog};
use crate::traits::{NodeBehavior, NodeTypeProvider};

/// Builds the behaviour of a freshly created node. May reshape the node's ports.
pub type FreshConstructor = Arc<
    dyn Fn(&mut NodeShape, &NodeServices) -> Result<Box<dyn NodeBehavior>, ConstructionError>
        + Send
        + Sync,
>;

/// Builds the behaviour of a node from its document object.
pub type DocumentConstructor = Arc<
    dyn Fn(
            &NodeShape,
            &Map<String, Value>,
            &NodeServices,
        ) -> Result<Box<dyn NodeBehavior>, ConstructionError>
        + Send
        + Sync,
>;

/// The pair of constructors registered for a node type.
#[derive(Clone)]
pub struct NodeConstructors {
    pub fresh: FreshConstructor,
    pub from_document: DocumentConstructor,
}

impl NodeConstructors {
    pub fn new<F, D>(fresh: F, from_document: D) -> Self
    where
        F: Fn(&mut NodeShape, &NodeServices) -> Result<Box<dyn NodeBehavior>, ConstructionError>
            + Send
            + Sync
            + 'static,
        D: Fn(
                &NodeShape,
                &Map<String, Value>,
                &NodeServices,
            ) -> Result<Box<dyn NodeBehavior>, ConstructionError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            fresh: Arc::new(fresh),
            from_document: Arc::new(from_document),
        }
    }
}

impl std::fmt::Debug for NodeConstructors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeConstructors").finish_non_exhaustive()
    }
}

/// A resolved registry entry.
#[derive(Debug, Clone)]
pub struct RegisteredType {
    pub descriptor: NodeTypeDescriptor,
    pub constructors: NodeConstructors,
}

/// Type id → descriptor and constructors.
#[derive(Debug, Default)]
pub struct NodeTypeRegistry {
    types: HashMap<String, RegisteredType>,
}

impl NodeTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with every built-in node type.
    pub fn with_builtin_types() -> Result<Self, RegistryError> {
        Self::discover(&crate::nodes::builtin_providers())
    }

    /// Build a registry from a declared set of providers.
    pub fn discover(providers: &[Box<dyn NodeTypeProvider>]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.register(provider.descriptor(), provider.constructors())?;
        }
        Ok(registry)
    }

    pub fn register(
        &mut self,
        descriptor: NodeTypeDescriptor,
        constructors: NodeConstructors,
    ) -> Result<(), RegistryError> {
        if self.types.contains_key(&descriptor.type_id) {
            return Err(RegistryError::DuplicateType(descriptor.type_id));
        }

        NodeTypeRegistered {
            type_id: &descriptor.type_id,
            group: &descriptor.group,
            inputs: descriptor.number_of_inputs,
            outputs: descriptor.number_of_outputs,
        }
        .log();

        self.types.insert(
            descriptor.type_id.clone(),
            RegisteredType {
                descriptor,
                constructors,
            },
        );
        Ok(())
    }

    pub fn resolve(&self, type_id: &str) -> Result<&RegisteredType, RegistryError> {
        self.types
            .get(type_id)
            .ok_or_else(|| RegistryError::UnknownNodeType(type_id.to_string()))
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All descriptors, ordered by group and then type id.
    pub fn descriptors(&self) -> Vec<&NodeTypeDescriptor> {
        let mut descriptors: Vec<_> = self.types.values().map(|t| &t.descriptor).collect();
        descriptors.sort_by(|a, b| a.group.cmp(&b.group).then_with(|| a.type_id.cmp(&b.type_id)));
        descriptors
    }
}
