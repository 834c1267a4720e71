// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

/// Node placement used when a document omits or garbles `X`/`Y`.
pub const DEFAULT_NODE_X: i32 = 100;
pub const DEFAULT_NODE_Y: i32 = 100;

/// Placement of ports allocated for a freshly created node.
pub const FRESH_PORT_POSITION: (f64, f64) = (1.0, 1.0);

/// Buffered events per node before slow subscribers start lagging.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// How often a waiting node refreshes its progress.
pub const PROGRESS_TICK: Duration = Duration::from_millis(250);

pub const DEFAULT_STORE_FILE_NAME: &str = "KeyValueStore.json";
/// 0 keeps the store in memory only.
pub const DEFAULT_FLUSH_INTERVAL_SECONDS: u64 = 0;
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;
