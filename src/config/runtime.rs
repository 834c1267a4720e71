// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{load_settings, NodeFlowSettings};
use crate::document::GraphCodec;
use crate::engine::{NodeFactory, NodeServices};
use crate::errors::ConfigError;
use crate::registry::NodeTypeRegistry;
use crate::storage::KeyValueStore;
use crate::traits::{EnvironmentSource, NodeTypeProvider, ProcessEnvironment};

/// Everything needed to load, run and save graphs.
///
/// The store is always present; with a flush interval of 0 it lives in
/// memory only.
#[derive(Clone, Debug)]
pub struct Runtime {
    pub settings: NodeFlowSettings,
    pub registry: Arc<NodeTypeRegistry>,
    pub store: Arc<KeyValueStore>,
    pub factory: NodeFactory,
    pub codec: GraphCodec,
}

impl Runtime {
    /// Starts the periodic store flusher, if the store is persistent.
    pub fn start_flusher(&self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        self.store.spawn_flusher(shutdown)
    }
}

/// Runtime builder - assembles the registry, store, factory and codec from settings.
///
/// # Examples
///
/// ## Building a runtime from default settings
/// ```
/// use nodeflow::config::{NodeFlowSettings, RuntimeBuilder};
///
/// let runtime = RuntimeBuilder::from_settings(&NodeFlowSettings::default()).unwrap();
///
/// assert!(runtime.registry.contains("Inject"));
/// assert!(!runtime.store.is_persistent());
/// ```
///
/// ## Adding a node type and a fixed environment
/// ```no_run
/// use nodeflow::config::{NodeFlowSettings, RuntimeBuilder};
/// # fn provider() -> Box<dyn nodeflow::traits::NodeTypeProvider> { unimplemented!() }
///
/// let runtime = RuntimeBuilder::new(NodeFlowSettings::default())
///     .with_provider(provider())
///     .build()
///     .unwrap();
/// ```
pub struct RuntimeBuilder {
    settings: NodeFlowSettings,
    providers: Vec<Box<dyn NodeTypeProvider>>,
    environment: Arc<dyn EnvironmentSource>,
}

impl RuntimeBuilder {
    /// A builder seeded with every built-in node type and the process environment.
    pub fn new(settings: NodeFlowSettings) -> Self {
        Self {
            settings,
            providers: crate::nodes::builtin_providers(),
            environment: Arc::new(ProcessEnvironment),
        }
    }

    /// Build a runtime with the built-in node types.
    pub fn from_settings(settings: &NodeFlowSettings) -> Result<Runtime, ConfigError> {
        Self::new(settings.clone()).build()
    }

    /// Load settings from a YAML file and build a runtime from them.
    pub fn from_settings_file(path: impl AsRef<Path>) -> Result<Runtime, ConfigError> {
        Self::new(load_settings(path)?).build()
    }

    pub fn with_provider(mut self, provider: Box<dyn NodeTypeProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_environment(mut self, environment: Arc<dyn EnvironmentSource>) -> Self {
        self.environment = environment;
        self
    }

    pub fn build(self) -> Result<Runtime, ConfigError> {
        self.settings.validate()?;

        let registry = Arc::new(NodeTypeRegistry::discover(&self.providers)?);
        let store = Arc::new(KeyValueStore::open(&self.settings.key_value_store)?);
        let services = NodeServices::new()
            .with_store(Arc::clone(&store))
            .with_environment(self.environment);
        let factory = NodeFactory::new(Arc::clone(&registry), services)
            .with_event_capacity(self.settings.engine.event_capacity);
        let codec = GraphCodec::new(factory.clone());

        Ok(Runtime {
            settings: self.settings,
            registry,
            store,
            factory,
            codec,
        })
    }
}
