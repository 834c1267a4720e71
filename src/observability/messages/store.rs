// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for key-value store persistence.

use crate::errors::StoreError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::path::Path;
use tracing::Span;

/// Entries were read from the backing file at open.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StoreLoaded<'a> {
    pub path: &'a Path,
    pub entries: usize,
    pub skipped: usize,
}

impl Display for StoreLoaded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loaded {} key-value entries from '{}' ({} skipped over capacity)",
            self.entries,
            self.path.display(),
            self.skipped
        )
    }
}

impl StructuredLog for StoreLoaded<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path.display(),
            entries = self.entries,
            skipped = self.skipped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "store_loaded",
            span_name = name,
            path = %self.path.display(),
            entries = self.entries,
        )
    }
}

/// A snapshot was written to the backing file.
///
/// # Log Level
/// `debug!` - Routine periodic work
pub struct StoreFlushed<'a> {
    pub path: &'a Path,
    pub entries: usize,
}

impl Display for StoreFlushed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flushed {} key-value entries to '{}'",
            self.entries,
            self.path.display()
        )
    }
}

impl StructuredLog for StoreFlushed<'_> {
    fn log(&self) {
        tracing::debug!(path = %self.path.display(), entries = self.entries, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("store_flushed", span_name = name, entries = self.entries)
    }
}

/// A periodic flush failed; the flusher keeps running.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct StoreFlushFailed<'a> {
    pub error: &'a StoreError,
}

impl Display for StoreFlushFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Key-value store flush failed: {}", self.error)
    }
}

impl StructuredLog for StoreFlushFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("store_flush_failed", span_name = name, error = %self.error)
    }
}
