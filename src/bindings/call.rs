// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::bindings::{BlockHandle, Bindings};
use crate::chain::append_to_current;
use crate::errors::BindingError;
use crate::types::{tag_of, HostValue};

/// Builder for one block: collects named parameters, then builds or appends.
///
/// Parameters are applied in the order they were given. The first failure
/// aborts the build and the half-configured block is released.
#[must_use = "a block call does nothing until `build` or `append` is called"]
pub struct BlockCall<'a> {
    bindings: &'a Bindings,
    name: String,
    params: Vec<(String, HostValue)>,
}

impl<'a> BlockCall<'a> {
    pub(crate) fn new(bindings: &'a Bindings, name: impl Into<String>) -> Self {
        Self {
            bindings,
            name: name.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<HostValue>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Set the parameter only when a value is supplied
    pub fn maybe_param(self, name: impl Into<String>, value: Option<HostValue>) -> Self {
        match value {
            Some(value) => self.param(name, value),
            None => self,
        }
    }

    pub fn build(self) -> Result<BlockHandle, BindingError> {
        let mut handle = self.bindings.create_block(&self.name)?;
        for (parameter, value) in self.params {
            let value = tag_of(value)?;
            handle.set_named(&parameter, value)?;
        }
        Ok(handle)
    }

    /// Build the block and append it to this thread's current chain.
    pub fn append(self) -> Result<(), BindingError> {
        append_to_current(self.build()?)
    }
}
