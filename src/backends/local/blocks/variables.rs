// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{check_param, text_of};
use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet, TypeTag};

fn global_name(value: &TaggedValue, block: &str) -> Result<String, BlockError> {
    let name = text_of(value);
    if name.is_empty() {
        return Err(BlockError::Failed(format!("{} needs a global name", block)));
    }
    Ok(name)
}

/// Stores its input in a node global and forwards it.
#[derive(Default)]
pub struct SetGlobalBlock {
    name: TaggedValue,
}

impl SetGlobalBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for SetGlobalBlock {
    fn name(&self) -> &str {
        "SetGlobal"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Name", [TypeTag::String, TypeTag::ContextVar])
            .with_help("The name of the global to write.")]
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
        let name = global_name(&self.name, "SetGlobal")?;
        ctx.set_global(name, input.clone());
        Ok(Flow::Continue(input))
    }
}

/// Outputs a node global, or `Default` when it is not set.
#[derive(Default)]
pub struct GetGlobalBlock {
    name: TaggedValue,
    default: TaggedValue,
}

impl GetGlobalBlock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Block for GetGlobalBlock {
    fn name(&self) -> &str {
        "GetGlobal"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![
            ParameterDescriptor::new("Name", [TypeTag::String, TypeTag::ContextVar])
                .with_help("The name of the global to read."),
            ParameterDescriptor::new("Default", TypeSet::any())
                .with_help("Output when the global is not set."),
        ]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        match index {
            0 => self.name = value,
            _ => self.default = value,
        }
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        match index {
            0 => Some(self.name.clone()),
            1 => Some(self.default.clone()),
            _ => None,
        }
    }

    fn activate(&mut self, ctx: &mut ActivationContext<'_>, _input: TaggedValue) -> Result<Flow, BlockError> {
        let name = global_name(&self.name, "GetGlobal")?;
        let value = ctx
            .get_global(&name)
            .cloned()
            .unwrap_or_else(|| self.default.clone());
        Ok(Flow::Continue(value))
    }
}
