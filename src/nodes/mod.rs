// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in node types.

pub mod debug;
pub mod delay;
pub mod inject;
pub mod parameter;
pub mod store;
pub mod timing;

#[cfg(test)]
pub mod stub;

pub use debug::{DebugNode, DebugProvider};
pub use delay::{DelayNode, DelayProvider};
pub use inject::{InjectConfig, InjectNode, InjectProvider};
pub use parameter::{Parameter, ParameterSource, ParameterType};
pub use store::{StoreNode, StoreProvider};
pub use timing::{Interval, TimeUnit};

use crate::traits::NodeTypeProvider;

/// Providers for every built-in node type.
pub fn builtin_providers() -> Vec<Box<dyn NodeTypeProvider>> {
    vec![
        Box::new(InjectProvider),
        Box::new(DebugProvider),
        Box::new(DelayProvider),
        Box::new(StoreProvider),
    ]
}
