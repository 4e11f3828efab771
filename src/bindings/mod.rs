// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The binding facade: blocks by name, with parameters and cached descriptors.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use the_chainwright::backends::local::LocalEngine;
//! use the_chainwright::bindings::Bindings;
//!
//! let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
//! let add = bindings.block("Math.Add").param("operand", 2).build()?;
//! assert_eq!(add.name(), "Math.Add");
//! # Ok::<(), the_chainwright::errors::BindingError>(())
//! ```

use std::sync::Arc;

use crate::chain::Chain;
use crate::descriptor::{BlockDescriptor, DescriptorCache};
use crate::errors::BindingError;
use crate::observability::messages::{binding::UnknownBlockRequested, StructuredLog};
use crate::traits::Engine;

mod call;
mod handle;

pub use call::BlockCall;
pub use handle::BlockHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingOptions {
    /// Default for chains created through [`Bindings::chain`]
    pub validate_connections: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            validate_connections: true,
        }
    }
}

pub struct Bindings {
    engine: Arc<dyn Engine>,
    cache: Arc<DescriptorCache>,
    options: BindingOptions,
}

impl Bindings {
    pub fn new(engine: Arc<dyn Engine>) -> Self {
        Self::with_options(engine, BindingOptions::default())
    }

    pub fn with_options(engine: Arc<dyn Engine>, options: BindingOptions) -> Self {
        Self {
            engine,
            cache: Arc::new(DescriptorCache::new()),
            options,
        }
    }

    pub fn options(&self) -> BindingOptions {
        self.options
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    pub fn cache(&self) -> &Arc<DescriptorCache> {
        &self.cache
    }

    /// Create and set up a block by name.
    pub fn create_block(&self, name: &str) -> Result<BlockHandle, BindingError> {
        match self.engine.create_block(name) {
            Some(instance) => Ok(BlockHandle::cached(instance, &self.cache)),
            None => {
                UnknownBlockRequested { name }.log();
                Err(BindingError::UnknownBlockName {
                    name: name.to_string(),
                })
            }
        }
    }

    pub fn block(&self, name: impl Into<String>) -> BlockCall<'_> {
        BlockCall::new(self, name)
    }

    /// Descriptor for a block name, introspecting a throwaway instance if needed.
    pub fn descriptor(&self, name: &str) -> Result<Arc<BlockDescriptor>, BindingError> {
        if let Some(found) = self.cache.get(name) {
            return Ok(found);
        }
        let handle = self.create_block(name)?;
        Ok(handle.descriptor().clone())
    }

    /// Descriptors for every block the engine knows, sorted by name.
    pub fn descriptors(&self) -> Result<Vec<Arc<BlockDescriptor>>, BindingError> {
        let mut names = self.engine.block_names();
        names.sort();
        names.dedup();
        names.iter().map(|name| self.descriptor(name)).collect()
    }

    /// A new empty chain that follows these bindings' validation default.
    pub fn chain(&self, name: impl Into<String>) -> Chain {
        Chain::new(name).with_validation(self.options.validate_connections)
    }
}
