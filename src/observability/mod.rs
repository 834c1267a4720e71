// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic the engine emits is a small message struct with a
//! `Display` implementation, so log text lives in one place and each event
//! carries typed fields alongside its rendered message.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::registry` - node type registration
//! * `messages::graph` - node creation, graph membership, runs and shutdown
//! * `messages::node` - per-node execution, fan-out and diagnostics
//! * `messages::document` - graph document load and save
//! * `messages::store` - key-value store load and flush
//!
//! # Usage
//!
//! ```rust
//! use nodeflow::observability::messages::{graph::GraphRunStarted, StructuredLog};
//!
//! GraphRunStarted {
//!     node_count: 4,
//!     started: 1,
//! }
//! .log();
//! ```

pub mod messages;
