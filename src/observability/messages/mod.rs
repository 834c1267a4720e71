// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit itself at its documented level with its fields
//! attached.
//!
//! # Organization
//!
//! * `registry` - node type registration
//! * `graph` - graph membership, wiring and lifecycle
//! * `node` - node execution and diagnostics
//! * `document` - graph document codec
//! * `store` - key-value store persistence

use tracing::Span;

pub mod document;
pub mod graph;
pub mod node;
pub mod registry;
pub mod store;

/// A message that knows its own log level and structured fields.
pub trait StructuredLog {
    /// Emits the message at its documented level.
    fn log(&self);

    /// A span carrying the message's fields.
    fn span(&self, name: &str) -> Span;
}
