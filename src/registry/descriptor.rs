// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;

/// Static metadata for a node type.
///
/// A descriptor is registered once at startup and never changes afterwards.
/// The port counts drive port allocation for freshly created nodes; the flag
/// defaults seed new nodes and documents that omit `IsEnabled`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NodeTypeDescriptor {
    pub type_id: String,
    pub display_name: String,
    pub group: String,
    pub number_of_inputs: usize,
    pub number_of_outputs: usize,
    pub activate_on_start: bool,
    pub enabled: bool,
    pub overview: String,
}

impl NodeTypeDescriptor {
    pub fn new(type_id: impl Into<String>, group: impl Into<String>) -> Self {
        let type_id = type_id.into();
        Self {
            display_name: type_id.clone(),
            type_id,
            group: group.into(),
            number_of_inputs: 0,
            number_of_outputs: 0,
            activate_on_start: false,
            enabled: true,
            overview: String::new(),
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_ports(mut self, inputs: usize, outputs: usize) -> Self {
        self.number_of_inputs = inputs;
        self.number_of_outputs = outputs;
        self
    }

    pub fn activating_on_start(mut self, activate_on_start: bool) -> Self {
        self.activate_on_start = activate_on_start;
        self
    }

    pub fn enabled_by_default(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_overview(mut self, overview: impl Into<String>) -> Self {
        self.overview = overview.into();
        self
    }
}
