// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::registry::{NodeConstructors, NodeTypeDescriptor};

/// A declared source of one node type, consumed once by registry discovery.
pub trait NodeTypeProvider: Send + Sync {
    fn descriptor(&self) -> NodeTypeDescriptor;

    fn constructors(&self) -> NodeConstructors;
}
