// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::traits::Block;

/// The engine's block factory surface.
pub trait Engine: Send + Sync {
    /// Create a fresh block instance, or `None` if the name is unknown
    fn create_block(&self, name: &str) -> Option<Box<dyn Block>>;

    /// Every block name the engine can create, namespaced names included
    fn block_names(&self) -> Vec<String>;
}
