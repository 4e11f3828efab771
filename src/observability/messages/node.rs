// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node scheduling and chain execution.
//!
//! This module contains message types for logging events related to:
//! * Scheduling chains into a node
//! * Suspension and resumption of chains
//! * Chain completion, stopping and failure
//! * Node shutdown and the async run loop

use crate::errors::BlockError;
use crate::node::{ResumeCondition, TickSummary};
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A chain was moved into a node.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_chainwright::observability::messages::node::ChainScheduled;
///
/// let msg = ChainScheduled {
///     node: "main",
///     chain: "counter",
///     looped: true,
///     unsafe_: false,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ChainScheduled<'a> {
    pub node: &'a str,
    pub chain: &'a str,
    pub looped: bool,
    pub unsafe_: bool,
}

impl Display for ChainScheduled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scheduled chain '{}' on node '{}' (looped={}, unsafe={})",
            self.chain, self.node, self.looped, self.unsafe_
        )
    }
}

impl StructuredLog for ChainScheduled<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            chain = self.chain,
            looped = self.looped,
            unsafe_ = self.unsafe_,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_scheduled",
            span_name = name,
            node = self.node,
            chain = self.chain,
        )
    }
}

/// A chain yielded to the node and stored a continuation.
///
/// # Log Level
/// `debug!` - Happens on every cooperative suspension
pub struct ChainSuspended<'a> {
    pub chain: &'a str,
    pub block: &'a str,
    pub condition: &'a ResumeCondition,
}

impl Display for ChainSuspended<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' suspended after '{}' until {}",
            self.chain, self.block, self.condition
        )
    }
}

impl StructuredLog for ChainSuspended<'_> {
    fn log(&self) {
        tracing::debug!(
            chain = self.chain,
            block = self.block,
            condition = %self.condition,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chain_suspended",
            span_name = name,
            chain = self.chain,
            block = self.block,
        )
    }
}

/// A suspended chain's condition was satisfied.
///
/// # Log Level
/// `debug!`
pub struct ChainResumed<'a> {
    pub chain: &'a str,
    pub resume_at: usize,
}

impl Display for ChainResumed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' resumed at block {}",
            self.chain, self.resume_at
        )
    }
}

impl StructuredLog for ChainResumed<'_> {
    fn log(&self) {
        tracing::debug!(chain = self.chain, resume_at = self.resume_at, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chain_resumed",
            span_name = name,
            chain = self.chain,
            resume_at = self.resume_at,
        )
    }
}

/// A chain is about to take its step for the current tick.
///
/// # Log Level
/// `trace!` - Emitted for every chain on every tick
pub struct ChainStepStarted<'a> {
    pub node: &'a str,
    pub chain: &'a str,
    pub resume_at: usize,
}

impl Display for ChainStepStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' stepping from block {}",
            self.chain, self.resume_at
        )
    }
}

impl StructuredLog for ChainStepStarted<'_> {
    fn log(&self) {
        tracing::trace!(
            node = self.node,
            chain = self.chain,
            resume_at = self.resume_at,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "chain_step",
            span_name = name,
            node = self.node,
            chain = self.chain,
        )
    }
}

/// A chain ran its last block.
///
/// # Log Level
/// `info!` for chains that stop afterwards, `debug!` for looped iterations
pub struct ChainCompleted<'a> {
    pub chain: &'a str,
    pub iterations: u64,
    pub looped: bool,
}

impl Display for ChainCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.looped {
            write!(
                f,
                "Chain '{}' completed iteration {}",
                self.chain, self.iterations
            )
        } else {
            write!(f, "Chain '{}' completed", self.chain)
        }
    }
}

impl StructuredLog for ChainCompleted<'_> {
    fn log(&self) {
        if self.looped {
            tracing::debug!(chain = self.chain, iterations = self.iterations, "{}", self);
        } else {
            tracing::info!(chain = self.chain, iterations = self.iterations, "{}", self);
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_completed",
            span_name = name,
            chain = self.chain,
            iterations = self.iterations,
        )
    }
}

/// A chain was stopped and its blocks released.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ChainStopped<'a> {
    pub node: &'a str,
    pub chain: &'a str,
    pub reason: &'a str,
}

impl Display for ChainStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stopped chain '{}' on node '{}': {}",
            self.chain, self.node, self.reason
        )
    }
}

impl StructuredLog for ChainStopped<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            chain = self.chain,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "chain_stopped",
            span_name = name,
            node = self.node,
            chain = self.chain,
        )
    }
}

/// A block activation failed and took its chain down.
///
/// # Log Level
/// `error!` - Execution failure
pub struct ChainFailed<'a> {
    pub node: &'a str,
    pub chain: &'a str,
    pub block: &'a str,
    pub error: &'a BlockError,
}

impl Display for ChainFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Chain '{}' on node '{}' failed in block '{}': {}",
            self.chain, self.node, self.block, self.error
        )
    }
}

impl StructuredLog for ChainFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            chain = self.chain,
            block = self.block,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "chain_failed",
            span_name = name,
            node = self.node,
            chain = self.chain,
            block = self.block,
        )
    }
}

/// A node stop was requested through a stop handle or a block.
///
/// # Log Level
/// `info!`
pub struct NodeStopRequested<'a> {
    pub node: &'a str,
}

impl Display for NodeStopRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stop requested for node '{}'", self.node)
    }
}

impl StructuredLog for NodeStopRequested<'_> {
    fn log(&self) {
        tracing::info!(node = self.node, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_stop_requested", span_name = name, node = self.node)
    }
}

/// The node released every chain.
///
/// # Log Level
/// `info!` - Important operational event
pub struct NodeStopped<'a> {
    pub node: &'a str,
    pub chains: usize,
    pub ticks: u64,
}

impl Display for NodeStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' stopped after {} tick(s), released {} chain(s)",
            self.node, self.ticks, self.chains
        )
    }
}

impl StructuredLog for NodeStopped<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            chains = self.chains,
            ticks = self.ticks,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_stopped", span_name = name, node = self.node)
    }
}

/// One tick finished.
///
/// # Log Level
/// `trace!` - Emitted every tick
pub struct TickCompleted<'a> {
    pub node: &'a str,
    pub summary: &'a TickSummary,
}

impl Display for TickCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' tick {}: {} ran, {} suspended, {} stopped",
            self.node,
            self.summary.tick,
            self.summary.ran,
            self.summary.suspended,
            self.summary.stopped
        )
    }
}

impl StructuredLog for TickCompleted<'_> {
    fn log(&self) {
        tracing::trace!(
            node = self.node,
            tick = self.summary.tick,
            ran = self.summary.ran,
            suspended = self.summary.suspended,
            stopped = self.summary.stopped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "tick",
            span_name = name,
            node = self.node,
            tick = self.summary.tick,
        )
    }
}

/// A block emitted a message while running (`Log`, `Msg`).
///
/// # Log Level
/// `info!` - User-visible output
pub struct BlockOutput<'a> {
    pub chain: &'a str,
    pub block: &'a str,
    pub message: &'a str,
}

impl Display for BlockOutput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.chain, self.block, self.message)
    }
}

impl StructuredLog for BlockOutput<'_> {
    fn log(&self) {
        tracing::info!(chain = self.chain, block = self.block, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "block_output",
            span_name = name,
            chain = self.chain,
            block = self.block,
        )
    }
}

/// The async run loop returned.
///
/// # Log Level
/// `info!`
pub struct RunFinished<'a> {
    pub node: &'a str,
    pub ticks: u64,
    pub reason: &'a str,
}

impl Display for RunFinished<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' run finished after {} tick(s): {}",
            self.node, self.ticks, self.reason
        )
    }
}

impl StructuredLog for RunFinished<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            ticks = self.ticks,
            reason = self.reason,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_run", span_name = name, node = self.node)
    }
}
