// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default pause between ticks when running a node (roughly 60 ticks per second)
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;
/// Node name used when a description does not name its node
pub const DEFAULT_NODE_NAME: &str = "main";
