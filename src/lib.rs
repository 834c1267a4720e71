// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod config;     // settings + runtime assembly
pub mod document;   // graph document codec
pub mod engine;     // graph, nodes, fan-out
pub mod errors;     // error handling
pub mod nodes;      // built-in node types
pub mod observability;
pub mod registry;   // node type registry
pub mod storage;    // shared key-value store
pub mod traits;     // unified abstractions
pub mod utils;
