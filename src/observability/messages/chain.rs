// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for chain assembly.

use crate::observability::messages::StructuredLog;
use crate::types::TypeSet;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A block joined a chain.
///
/// # Log Level
/// `debug!` - Routine construction event
pub struct BlockAppended<'a> {
    pub chain: &'a str,
    pub block: &'a str,
    pub position: usize,
}

impl Display for BlockAppended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Appended '{}' to chain '{}' at position {}",
            self.block, self.chain, self.position
        )
    }
}

impl StructuredLog for BlockAppended<'_> {
    fn log(&self) {
        tracing::debug!(
            chain = self.chain,
            block = self.block,
            position = self.position,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "block_appended",
            span_name = name,
            chain = self.chain,
            block = self.block,
            position = self.position,
        )
    }
}

/// Two adjacent blocks have no type in common.
///
/// # Log Level
/// `warn!` - The append was refused and the chain is unchanged
pub struct ConnectionRejected<'a> {
    pub chain: &'a str,
    pub producer: &'a str,
    pub consumer: &'a str,
    pub outputs: &'a TypeSet,
    pub inputs: &'a TypeSet,
}

impl Display for ConnectionRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' rejected connection '{}' {} -> '{}' {}",
            self.chain, self.producer, self.outputs, self.consumer, self.inputs
        )
    }
}

impl StructuredLog for ConnectionRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            chain = self.chain,
            producer = self.producer,
            consumer = self.consumer,
            outputs = %self.outputs,
            inputs = %self.inputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "connection_rejected",
            span_name = name,
            chain = self.chain,
            producer = self.producer,
            consumer = self.consumer,
        )
    }
}

/// A chain became the current chain of this thread.
///
/// # Log Level
/// `debug!`
pub struct ScopeEntered<'a> {
    pub chain: &'a str,
    pub depth: usize,
}

impl Display for ScopeEntered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Entered chain scope '{}' (depth {})", self.chain, self.depth)
    }
}

impl StructuredLog for ScopeEntered<'_> {
    fn log(&self) {
        tracing::debug!(chain = self.chain, depth = self.depth, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chain_scope",
            span_name = name,
            chain = self.chain,
            depth = self.depth,
        )
    }
}

/// A chain scope was dropped without being finished; its chain is released.
///
/// # Log Level
/// `debug!`
pub struct ScopeDiscarded<'a> {
    pub chain: &'a str,
    pub blocks: usize,
}

impl Display for ScopeDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discarded unfinished chain '{}' with {} block(s)",
            self.chain, self.blocks
        )
    }
}

impl StructuredLog for ScopeDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(chain = self.chain, blocks = self.blocks, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("scope_discarded", span_name = name, chain = self.chain)
    }
}
