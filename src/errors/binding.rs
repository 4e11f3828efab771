// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Construction-time errors of the binding layer.
//!
//! Every variant describes a mistake in the pipeline description itself, so
//! they are raised synchronously where the mistake is made and never retried.

use thiserror::Error;

use crate::errors::BlockError;
use crate::types::{TypeSet, TypeTag};

#[derive(Error, Debug)]
pub enum BindingError {
    /// The host value has no canonical tagged shape.
    #[error("Unrepresentable value: {reason}")]
    UnrepresentableValue { reason: String },

    /// Adjacent blocks' type sets do not intersect.
    #[error("Cannot connect '{producer}' {outputs} to '{consumer}' {inputs}")]
    IncompatibleConnection {
        producer: String,
        consumer: String,
        outputs: TypeSet,
        inputs: TypeSet,
    },

    /// A chain was declared or scheduled without any blocks.
    #[error("Chain '{chain}' has no blocks")]
    MissingRequiredStructure { chain: String },

    #[error("Unknown block name: '{name}'")]
    UnknownBlockName { name: String },

    #[error("Block '{block}' has no parameter named '{parameter}'")]
    UnknownParameter { block: String, parameter: String },

    #[error("Parameter '{parameter}' of block '{block}' expects {expected}, got {found}")]
    InvalidParameter {
        block: String,
        parameter: String,
        expected: TypeSet,
        found: TypeTag,
    },

    #[error("No chain is currently being built")]
    NoCurrentChain,

    #[error("Node has been stopped")]
    NodeStopped,

    #[error("Chain '{chain}' was stopped and cannot be scheduled again")]
    ChainStopped { chain: String },

    #[error("A chain named '{chain}' is already scheduled in this node")]
    DuplicateChainName { chain: String },

    #[error("No scheduled chain with id {id}")]
    UnknownChain { id: u64 },

    #[error("Malformed stored value: {reason}")]
    MalformedValue { reason: String },

    #[error("Block '{block}' rejected the operation: {source}")]
    Block {
        block: String,
        #[source]
        source: BlockError,
    },
}
