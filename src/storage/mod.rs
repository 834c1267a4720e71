// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared state available to nodes across executions.

mod key_value;

pub use key_value::KeyValueStore;
