// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::types::{TaggedValue, TypeSet};

/// What a chain should do after a block activation.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Feed the value to the next block
    Continue(TaggedValue),
    /// Yield to the node; `output` is fed to the next block once `on` is satisfied
    Suspend { on: SuspendOn, output: TaggedValue },
    /// End the chain with this output
    Stop(TaggedValue),
    /// Rewind to the first block on the next tick
    Restart,
}

/// Resumption requests a block can make when suspending.
#[derive(Debug, Clone, PartialEq)]
pub enum SuspendOn {
    Sleep(Duration),
    /// Wait until the named global is set
    Global(String),
    /// Wait until the named chain in the same node has stopped
    Chain(String),
    /// Resume on the next tick
    Yield,
}

/// A unit of computation owned by the engine.
///
/// The binding layer only reads the declared types and parameters once per
/// block name; they must not change with parameter values.
pub trait Block: Send {
    fn name(&self) -> &str;

    fn input_types(&self) -> TypeSet;

    fn output_types(&self) -> TypeSet;

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        Vec::new()
    }

    fn set_param(&mut self, index: usize, _value: TaggedValue) -> Result<(), BlockError> {
        Err(BlockError::NoSuchParameter { index })
    }

    fn get_param(&self, _index: usize) -> Option<TaggedValue> {
        None
    }

    /// Called once after creation, before any parameter is set
    fn setup(&mut self) {}

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError>;

    /// Called when the owning chain stops
    fn cleanup(&mut self) {}
}
