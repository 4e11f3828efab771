// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;

use crate::descriptor::{BlockDescriptor, DescriptorCache};
use crate::errors::{BindingError, BlockError};
use crate::node::ActivationContext;
use crate::observability::messages::{binding::*, StructuredLog};
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet};

/// An owned block instance travelling together with its cached descriptor.
///
/// The handle is moved, never cloned. Dropping it runs the block's cleanup,
/// so every block is cleaned up exactly once, whether it was rejected by a
/// chain, discarded with a scope or released by a node.
pub struct BlockHandle {
    descriptor: Arc<BlockDescriptor>,
    instance: Box<dyn Block>,
}

impl BlockHandle {
    /// Wrap a block that did not come from an engine, introspecting it directly.
    pub fn new(mut instance: Box<dyn Block>) -> Self {
        instance.setup();
        let descriptor = Arc::new(BlockDescriptor::introspect(instance.as_ref()));
        Self::created(descriptor, instance)
    }

    pub(crate) fn cached(mut instance: Box<dyn Block>, cache: &DescriptorCache) -> Self {
        instance.setup();
        let descriptor = cache.get_or_introspect(instance.as_ref());
        Self::created(descriptor, instance)
    }

    fn created(descriptor: Arc<BlockDescriptor>, instance: Box<dyn Block>) -> Self {
        BlockCreated {
            name: &descriptor.name,
            parameter_count: descriptor.parameters.len(),
        }
        .log();
        Self {
            descriptor,
            instance,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &Arc<BlockDescriptor> {
        &self.descriptor
    }

    pub fn input_types(&self) -> &TypeSet {
        &self.descriptor.input_types
    }

    pub fn output_types(&self) -> &TypeSet {
        &self.descriptor.output_types
    }

    /// Set a parameter by position after checking its tag against the descriptor.
    pub fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BindingError> {
        let parameter = self
            .descriptor
            .parameters
            .get(index)
            .ok_or_else(|| BindingError::Block {
                block: self.descriptor.name.clone(),
                source: BlockError::NoSuchParameter { index },
            })?;

        let found = value.tag();
        if !parameter.types.accepts(found) {
            return Err(BindingError::InvalidParameter {
                block: self.descriptor.name.clone(),
                parameter: parameter.name.clone(),
                expected: parameter.types.clone(),
                found,
            });
        }

        self.instance
            .set_param(index, value)
            .map_err(|source| BindingError::Block {
                block: self.descriptor.name.clone(),
                source,
            })
    }

    /// Set a parameter by raw or binding name, ignoring case.
    pub fn set_named(&mut self, name: &str, value: TaggedValue) -> Result<(), BindingError> {
        let tag = value.tag();
        let result = match self.descriptor.parameter_index(name) {
            Some(index) => self.set_param(index, value),
            None => Err(BindingError::UnknownParameter {
                block: self.descriptor.name.clone(),
                parameter: name.to_string(),
            }),
        };

        match &result {
            Ok(()) => ParameterApplied {
                block: &self.descriptor.name,
                parameter: name,
                tag,
            }
            .log(),
            Err(error) => ParameterRejected {
                block: &self.descriptor.name,
                parameter: name,
                error,
            }
            .log(),
        }
        result
    }

    pub fn get_param(&self, index: usize) -> Option<TaggedValue> {
        self.instance.get_param(index)
    }

    pub fn get_named(&self, name: &str) -> Option<TaggedValue> {
        self.descriptor
            .parameter_index(name)
            .and_then(|index| self.instance.get_param(index))
    }

    pub(crate) fn activate(
        &mut self,
        ctx: &mut ActivationContext<'_>,
        input: TaggedValue,
    ) -> Result<Flow, BlockError> {
        self.instance.activate(ctx, input)
    }
}

impl Drop for BlockHandle {
    fn drop(&mut self) {
        self.instance.cleanup();
    }
}

impl fmt::Debug for BlockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockHandle")
            .field("name", &self.descriptor.name)
            .field("inputs", &self.descriptor.input_types)
            .field("outputs", &self.descriptor.output_types)
            .finish()
    }
}
