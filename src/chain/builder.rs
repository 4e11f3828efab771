// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bindings::BlockHandle;
use crate::errors::BindingError;
use crate::observability::messages::{chain::*, StructuredLog};
use crate::types::TypeSet;
use crate::validation::compatible;

/// An ordered sequence of blocks whose adjacent types are known to connect.
///
/// Connections are checked when blocks are added, never at run time. A failed
/// `append` or `extend` leaves the chain exactly as it was.
pub struct Chain {
    name: String,
    blocks: Vec<BlockHandle>,
    looped: bool,
    unsafe_: bool,
    validate: bool,
}

impl Chain {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            blocks: Vec::new(),
            looped: false,
            unsafe_: false,
            validate: true,
        }
    }

    /// Build a chain from blocks, validating every adjacency before keeping any of them.
    pub fn from_blocks(name: impl Into<String>, blocks: Vec<BlockHandle>) -> Result<Self, BindingError> {
        let name = name.into();
        if blocks.is_empty() {
            return Err(BindingError::MissingRequiredStructure { chain: name });
        }
        let mut chain = Self::new(name);
        chain.extend(blocks)?;
        Ok(chain)
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn looped(mut self, looped: bool) -> Self {
        self.looped = looped;
        self
    }

    pub fn unsafe_(mut self, unsafe_: bool) -> Self {
        self.unsafe_ = unsafe_;
        self
    }

    pub fn set_looped(&mut self, looped: bool) {
        self.looped = looped;
    }

    pub fn set_unsafe(&mut self, unsafe_: bool) {
        self.unsafe_ = unsafe_;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_looped(&self) -> bool {
        self.looped
    }

    pub fn is_unsafe(&self) -> bool {
        self.unsafe_
    }

    pub fn validates_connections(&self) -> bool {
        self.validate
    }

    /// Append one block after checking it against the current last block.
    pub fn append(&mut self, block: BlockHandle) -> Result<(), BindingError> {
        self.try_append(block).map_err(|(error, _rejected)| error)
    }

    /// Like [`Chain::append`], but a rejected block is handed back to the caller.
    pub(crate) fn try_append(&mut self, block: BlockHandle) -> Result<(), (BindingError, BlockHandle)> {
        if let Some(last) = self.blocks.last() {
            if let Err(error) = self.check(last, &block) {
                return Err((error, block));
            }
        }
        self.push(block);
        Ok(())
    }

    /// Append several blocks atomically: either all of them join or none do.
    pub fn extend(&mut self, blocks: Vec<BlockHandle>) -> Result<(), BindingError> {
        let mut previous = self.blocks.last();
        for block in &blocks {
            if let Some(producer) = previous {
                self.check(producer, block)?;
            }
            previous = Some(block);
        }
        for block in blocks {
            self.push(block);
        }
        Ok(())
    }

    fn check(&self, producer: &BlockHandle, consumer: &BlockHandle) -> Result<(), BindingError> {
        if !self.validate || compatible(producer.output_types(), consumer.input_types()) {
            return Ok(());
        }

        ConnectionRejected {
            chain: &self.name,
            producer: producer.name(),
            consumer: consumer.name(),
            outputs: producer.output_types(),
            inputs: consumer.input_types(),
        }
        .log();

        Err(BindingError::IncompatibleConnection {
            producer: producer.name().to_string(),
            consumer: consumer.name().to_string(),
            outputs: producer.output_types().clone(),
            inputs: consumer.input_types().clone(),
        })
    }

    fn push(&mut self, block: BlockHandle) {
        BlockAppended {
            chain: &self.name,
            block: block.name(),
            position: self.blocks.len(),
        }
        .log();
        self.blocks.push(block);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.name()).collect()
    }

    pub fn blocks(&self) -> &[BlockHandle] {
        &self.blocks
    }

    /// Input requirement of the first block, if any
    pub fn input_types(&self) -> Option<&TypeSet> {
        self.blocks.first().map(|b| b.input_types())
    }

    /// Output declaration of the last block, if any
    pub fn output_types(&self) -> Option<&TypeSet> {
        self.blocks.last().map(|b| b.output_types())
    }

    pub(crate) fn block_mut(&mut self, index: usize) -> Option<&mut BlockHandle> {
        self.blocks.get_mut(index)
    }

    /// Release every block, last first. Cleanup runs as each handle drops.
    pub(crate) fn release(&mut self) {
        while let Some(block) = self.blocks.pop() {
            drop(block);
        }
    }
}

impl Drop for Chain {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("name", &self.name)
            .field("blocks", &self.block_names())
            .field("looped", &self.looped)
            .field("unsafe", &self.unsafe_)
            .finish()
    }
}
