// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Blocks that steer the scheduler: suspension, stopping and restarting.

use std::time::Duration;

use super::{check_param, text_of};
use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::traits::{Block, Flow, SuspendOn};
use crate::types::{TaggedValue, TypeSet, TypeTag};

/// Suspends the chain for `Time` seconds, then forwards its input.
pub struct SleepBlock {
    time: TaggedValue,
}

impl SleepBlock {
    pub fn new() -> Self {
        Self {
            time: TaggedValue::Float(0.0),
        }
    }

    fn duration(&self) -> Result<Duration, BlockError> {
        let seconds = self.time.as_float().unwrap_or(0.0);
        Duration::try_from_secs_f64(seconds)
            .map_err(|e| BlockError::Failed(format!("invalid sleep time {}: {}", seconds, e)))
    }
}

impl Default for SleepBlock {
    fn default() -> Self {
        Self::new()
    }
}

impl Block for SleepBlock {
    fn name(&self) -> &str {
        "Sleep"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Time", [TypeTag::Float, TypeTag::Int])
            .with_help("The amount of time in seconds to pause the chain.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        let previous = std::mem::replace(&mut self.time, value);
        if let Err(error) = self.duration() {
            self.time = previous;
            return Err(error);
        }
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.time.clone())
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Suspend {
            on: SuspendOn::Sleep(self.duration()?),
            output: input,
        })
    }
}

/// Gives the other chains a turn; resumes on the next tick.
#[derive(Default)]
pub struct YieldBlock;

impl Block for YieldBlock {
    fn name(&self) -> &str {
        "Yield"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Suspend {
            on: SuspendOn::Yield,
            output: input,
        })
    }
}

/// Suspends until the named global exists, then forwards its input.
#[derive(Default)]
pub struct WaitGlobalBlock {
    name: TaggedValue,
}

impl WaitGlobalBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for WaitGlobalBlock {
    fn name(&self) -> &str {
        "WaitGlobal"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Name", [TypeTag::String, TypeTag::ContextVar])
            .with_help("The global to wait for.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.name = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.name.clone())
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        let name = text_of(&self.name);
        if name.is_empty() {
            return Err(BlockError::Failed("WaitGlobal needs a global name".to_string()));
        }
        if ctx.get_global(&name).is_some() {
            return Ok(Flow::Continue(input));
        }
        Ok(Flow::Suspend {
            on: SuspendOn::Global(name),
            output: input,
        })
    }
}

/// Suspends until another chain of the same node has stopped.
#[derive(Default)]
pub struct WaitChainBlock {
    chain: TaggedValue,
}

impl WaitChainBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for WaitChainBlock {
    fn name(&self) -> &str {
        "WaitChain"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Chain", [TypeTag::Chain, TypeTag::String])
            .with_help("The chain to wait for.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.chain = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.chain.clone())
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        let chain = text_of(&self.chain);
        if chain.is_empty() {
            return Err(BlockError::Failed("WaitChain needs a chain name".to_string()));
        }
        Ok(Flow::Suspend {
            on: SuspendOn::Chain(chain),
            output: input,
        })
    }
}

/// Ends the chain, keeping its input as the chain's output.
#[derive(Default)]
pub struct ChainStopBlock;

impl Block for ChainStopBlock {
    fn name(&self) -> &str {
        "ChainStop"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Stop(input))
    }
}

/// Rewinds the chain to its first block on the next tick.
#[derive(Default)]
pub struct ChainRestartBlock;

impl Block for ChainRestartBlock {
    fn name(&self) -> &str {
        "ChainRestart"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, _input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Restart)
    }
}

/// Asks the node to stop at its next safe point.
#[derive(Default)]
pub struct NodeStopBlock;

impl Block for NodeStopBlock {
    fn name(&self) -> &str {
        "NodeStop"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        ctx.request_node_stop();
        Ok(Flow::Continue(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sleep_rejects_negative_time() {
        let mut sleep = SleepBlock::new();
        sleep.set_param(0, TaggedValue::Float(0.5)).unwrap();
        assert!(sleep.set_param(0, TaggedValue::Float(-1.0)).is_err());
        assert_eq!(sleep.get_param(0), Some(TaggedValue::Float(0.5)));
        assert_eq!(sleep.duration().unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_sleep_accepts_integer_seconds() {
        let mut sleep = SleepBlock::new();
        sleep.set_param(0, TaggedValue::Int(2)).unwrap();
        assert_eq!(sleep.duration().unwrap(), Duration::from_secs(2));
        assert!(matches!(
            sleep.set_param(0, TaggedValue::string("2")),
            Err(BlockError::InvalidParameter { index: 0, .. })
        ));
    }
}
