// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The graph document format: JSON codec, post-load validation, and helpers
//! for the loosely-shaped JSON node types read their settings from.

pub mod codec;
pub mod json;
pub mod validation;

pub use codec::GraphCodec;
pub use validation::{validate_graph, ValidationWarning};
