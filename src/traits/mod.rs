// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod behavior;
pub mod environment;
pub mod provider;

pub use behavior::NodeBehavior;
pub use environment::{EnvironmentSource, ProcessEnvironment};
pub use provider::NodeTypeProvider;
