// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex};

use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet};

/// Shared record of activations and cleanups, in the order they happened
pub type ActivationLog = Arc<Mutex<Vec<String>>>;

pub fn activation_log() -> ActivationLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// A pass-through block with configurable declarations, for tests and placeholders
pub struct StubBlock {
    name: String,
    inputs: TypeSet,
    outputs: TypeSet,
    parameters: Vec<ParameterDescriptor>,
    values: Vec<TaggedValue>,
    log: Option<ActivationLog>,
}

impl StubBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: TypeSet::any(),
            outputs: TypeSet::any(),
            parameters: Vec::new(),
            values: Vec::new(),
            log: None,
        }
    }

    pub fn with_types(mut self, inputs: impl Into<TypeSet>, outputs: impl Into<TypeSet>) -> Self {
        self.inputs = inputs.into();
        self.outputs = outputs.into();
        self
    }

    pub fn with_parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self.values.push(TaggedValue::None);
        self
    }

    pub fn traced(mut self, log: ActivationLog) -> Self {
        self.log = Some(log);
        self
    }

    fn record(&self, entry: String) {
        if let Some(log) = &self.log {
            log.lock().unwrap_or_else(|p| p.into_inner()).push(entry);
        }
    }
}

impl Block for StubBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> TypeSet {
        self.inputs.clone()
    }

    fn output_types(&self) -> TypeSet {
        self.outputs.clone()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        self.parameters.clone()
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        let slot = self
            .values
            .get_mut(index)
            .ok_or(BlockError::NoSuchParameter { index })?;
        *slot = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        self.values.get(index).cloned()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        self.record(self.name.clone());
        Ok(Flow::Continue(input))
    }

    fn cleanup(&mut self) {
        self.record(format!("cleanup:{}", self.name));
    }
}

/// A block that always fails, for testing failure propagation
pub struct FailingBlock {
    name: String,
}

impl FailingBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Block for FailingBlock {
    fn name(&self) -> &str {
        &self.name
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, _input: TaggedValue) -> Result<Flow, BlockError> {
        Err(BlockError::Failed("simulated block failure".to_string()))
    }
}
