// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;

pub mod consts;

pub use loader::{
    load_settings, parse_settings, EngineSettings, KeyValueStoreSettings, NodeFlowSettings,
};
pub use runtime::{Runtime, RuntimeBuilder};
