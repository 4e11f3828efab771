// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for block creation and parameter assignment.

use crate::errors::BindingError;
use crate::observability::messages::StructuredLog;
use crate::types::{TypeSet, TypeTag};
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A block instance was created through the engine.
///
/// # Log Level
/// `debug!` - Routine construction event
pub struct BlockCreated<'a> {
    pub name: &'a str,
    pub parameter_count: usize,
}

impl Display for BlockCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Created block '{}' with {} parameter(s)",
            self.name, self.parameter_count
        )
    }
}

impl StructuredLog for BlockCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            block = self.name,
            parameter_count = self.parameter_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "block_created",
            span_name = name,
            block = self.name,
            parameter_count = self.parameter_count,
        )
    }
}

/// A block name was introspected for the first time and its descriptor cached.
///
/// # Log Level
/// `debug!` - Happens once per block name
pub struct DescriptorCached<'a> {
    pub name: &'a str,
    pub inputs: &'a TypeSet,
    pub outputs: &'a TypeSet,
}

impl Display for DescriptorCached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cached descriptor for '{}': {} -> {}",
            self.name, self.inputs, self.outputs
        )
    }
}

impl StructuredLog for DescriptorCached<'_> {
    fn log(&self) {
        tracing::debug!(
            block = self.name,
            inputs = %self.inputs,
            outputs = %self.outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "descriptor_cached",
            span_name = name,
            block = self.name,
            inputs = %self.inputs,
            outputs = %self.outputs,
        )
    }
}

/// The engine does not know the requested block name.
///
/// # Log Level
/// `warn!` - Construction was rejected
pub struct UnknownBlockRequested<'a> {
    pub name: &'a str,
}

impl Display for UnknownBlockRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Engine has no block named '{}'", self.name)
    }
}

impl StructuredLog for UnknownBlockRequested<'_> {
    fn log(&self) {
        tracing::warn!(block = self.name, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unknown_block", span_name = name, block = self.name)
    }
}

/// A named parameter was tagged and set on a block.
///
/// # Log Level
/// `debug!` - Routine construction event
pub struct ParameterApplied<'a> {
    pub block: &'a str,
    pub parameter: &'a str,
    pub tag: TypeTag,
}

impl Display for ParameterApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Set parameter '{}' of '{}' to a {} value",
            self.parameter, self.block, self.tag
        )
    }
}

impl StructuredLog for ParameterApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            block = self.block,
            parameter = self.parameter,
            tag = %self.tag,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "parameter_applied",
            span_name = name,
            block = self.block,
            parameter = self.parameter,
            tag = %self.tag,
        )
    }
}

/// A parameter could not be resolved, tagged or accepted.
///
/// # Log Level
/// `warn!` - Construction was rejected
pub struct ParameterRejected<'a> {
    pub block: &'a str,
    pub parameter: &'a str,
    pub error: &'a BindingError,
}

impl Display for ParameterRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected parameter '{}' of '{}': {}",
            self.parameter, self.block, self.error
        )
    }
}

impl StructuredLog for ParameterRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            block = self.block,
            parameter = self.parameter,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "parameter_rejected",
            span_name = name,
            block = self.block,
            parameter = self.parameter,
        )
    }
}
