// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{check_param, text_of};
use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::observability::messages::{node::BlockOutput, StructuredLog};
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet, TypeTag};

/// Outputs its `Value` parameter, ignoring the input.
#[derive(Default)]
pub struct ConstBlock {
    value: TaggedValue,
}

impl ConstBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for ConstBlock {
    fn name(&self) -> &str {
        "Const"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Value", TypeSet::any()).with_help("The value to output.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.value = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.value.clone())
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, _input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Continue(self.value.clone()))
    }
}

/// Forwards its input unchanged.
#[derive(Default)]
pub struct PassBlock;

impl Block for PassBlock {
    fn name(&self) -> &str {
        "Pass"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Continue(input))
    }
}

/// Logs its input, optionally prefixed, and forwards it.
#[derive(Default)]
pub struct LogBlock {
    prefix: TaggedValue,
}

impl LogBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for LogBlock {
    fn name(&self) -> &str {
        "Log"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Prefix", [TypeTag::String, TypeTag::None])
            .with_help("Text written before the logged value.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.prefix = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.prefix.clone())
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        let prefix = text_of(&self.prefix);
        let message = if prefix.is_empty() {
            input.to_string()
        } else {
            format!("{}: {}", prefix, input)
        };
        BlockOutput {
            chain: ctx.chain_name(),
            block: self.name(),
            message: &message,
        }
        .log();
        Ok(Flow::Continue(input))
    }
}

/// Logs a fixed message and forwards its input.
#[derive(Default)]
pub struct MsgBlock {
    message: TaggedValue,
}

impl MsgBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for MsgBlock {
    fn name(&self) -> &str {
        "Msg"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Message", [TypeTag::String, TypeTag::None])
            .with_help("The message to display.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.message = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.message.clone())
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        BlockOutput {
            chain: ctx.chain_name(),
            block: self.name(),
            message: &text_of(&self.message),
        }
        .log();
        Ok(Flow::Continue(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::StopHandle;
    use std::collections::HashMap;
    use std::time::Instant;

    fn run(block: &mut dyn Block, input: TaggedValue) -> Result<Flow, BlockError> {
        let mut committed = HashMap::new();
        let mut staged = HashMap::new();
        let stop = StopHandle::new();
        let mut ctx = ActivationContext::new("test", Instant::now(), false, &mut committed, &mut staged, &stop);
        block.activate(&mut ctx, input)
    }

    #[test]
    fn test_const_ignores_its_input() {
        let mut block = ConstBlock::new();
        block.set_param(0, TaggedValue::float2(1.0, 2.0)).unwrap();
        assert_eq!(
            run(&mut block, TaggedValue::Int(9)).unwrap(),
            Flow::Continue(TaggedValue::float2(1.0, 2.0))
        );
    }

    #[test]
    fn test_log_and_msg_forward_their_input() {
        let mut log = LogBlock::new();
        log.set_param(0, TaggedValue::string("value")).unwrap();
        assert_eq!(
            run(&mut log, TaggedValue::Int(3)).unwrap(),
            Flow::Continue(TaggedValue::Int(3))
        );

        let mut msg = MsgBlock::new();
        assert!(matches!(
            msg.set_param(0, TaggedValue::Int(1)),
            Err(BlockError::InvalidParameter { index: 0, .. })
        ));
        assert_eq!(
            run(&mut msg, TaggedValue::Bool(true)).unwrap(),
            Flow::Continue(TaggedValue::Bool(true))
        );
    }
}
