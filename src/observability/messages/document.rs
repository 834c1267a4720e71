// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the graph document codec.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A document was loaded into a new graph.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use nodeflow::observability::messages::document::DocumentLoaded;
///
/// let msg = DocumentLoaded {
///     nodes: 4,
///     warnings: 0,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct DocumentLoaded {
    pub nodes: usize,
    pub warnings: usize,
}

impl Display for DocumentLoaded {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded graph document: {} nodes, {} warnings",
            self.nodes, self.warnings
        )
    }
}

impl StructuredLog for DocumentLoaded {
    fn log(&self) {
        tracing::info!(nodes = self.nodes, warnings = self.warnings, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "document_loaded",
            span_name = name,
            nodes = self.nodes,
            warnings = self.warnings,
        )
    }
}

/// A graph was serialized to a document.
///
/// # Log Level
/// `info!` - Important operational event
pub struct DocumentSaved {
    pub nodes: usize,
    pub bytes: usize,
}

impl Display for DocumentSaved {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Saved graph document: {} nodes, {} bytes",
            self.nodes, self.bytes
        )
    }
}

impl StructuredLog for DocumentSaved {
    fn log(&self) {
        tracing::info!(nodes = self.nodes, bytes = self.bytes, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("document_saved", span_name = name, nodes = self.nodes)
    }
}

/// An input port lists a parent that is not an output port in the graph.
///
/// # Log Level
/// `warn!` - Tolerated for older documents that list parent node ids
pub struct ParentUnresolved<'a> {
    pub node_id: &'a str,
    pub port_id: &'a str,
    pub parent_id: &'a str,
}

impl Display for ParentUnresolved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Input '{}' of node '{}' lists parent '{}' which is not an output port",
            self.port_id, self.node_id, self.parent_id
        )
    }
}

impl StructuredLog for ParentUnresolved<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            port_id = self.port_id,
            parent_id = self.parent_id,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "parent_unresolved",
            span_name = name,
            node_id = self.node_id,
            parent_id = self.parent_id,
        )
    }
}
