// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;

#[cfg(test)]
mod integration_tests;
pub mod consts;

pub use loader::{host_value, load_config, parse_config, BlockConfig, ChainConfig, NodeConfig};
pub use runtime::RuntimeBuilder;
