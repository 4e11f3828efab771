// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod builder;
mod context;

pub use builder::Chain;
pub use context::{append_to_current, current_chain_name, with_current_chain, ChainScope};
