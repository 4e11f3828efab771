// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while chains execute.

use std::fmt;
use thiserror::Error;

use crate::types::{TypeSet, TypeTag};

/// Failure reported by a block, either while configuring it or while it runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BlockError {
    #[error("no parameter at index {index}")]
    NoSuchParameter { index: usize },

    #[error("parameter {index} expects {expected}, got {found}")]
    InvalidParameter {
        index: usize,
        expected: TypeSet,
        found: TypeTag,
    },

    #[error("expected input {expected}, got {found}")]
    InvalidInput { expected: TypeSet, found: TypeTag },

    #[error("division by zero")]
    DivisionByZero,

    #[error("{0}")]
    Failed(String),
}

/// One chain that failed during a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainFailure {
    pub chain: String,
    pub block: String,
    pub error: BlockError,
}

impl fmt::Display for ChainFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chain '{}' failed in block '{}': {}",
            self.chain, self.block, self.error
        )
    }
}

/// Errors surfaced by the node scheduler.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{} chain(s) failed during tick {tick}: {}", .failures.len(), join_failures(.failures))]
    ChainsFailed { tick: u64, failures: Vec<ChainFailure> },
}

fn join_failures(failures: &[ChainFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
