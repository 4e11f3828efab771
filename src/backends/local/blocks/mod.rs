// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in blocks of the local engine.

pub mod casting;
pub mod common;
pub mod flow;
pub mod math;
pub mod variables;

use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::types::TaggedValue;

/// Check `value` against parameter `index` of `parameters`.
fn check_param(
    parameters: &[ParameterDescriptor],
    index: usize,
    value: &TaggedValue,
) -> Result<(), BlockError> {
    let parameter = parameters
        .get(index)
        .ok_or(BlockError::NoSuchParameter { index })?;
    let found = value.tag();
    if !parameter.types.accepts(found) {
        return Err(BlockError::InvalidParameter {
            index,
            expected: parameter.types.clone(),
            found,
        });
    }
    Ok(())
}

/// Text carried by a `String`/`ContextVar`/`Chain` parameter, empty for `None`.
fn text_of(value: &TaggedValue) -> String {
    match value {
        TaggedValue::Chain(chain) => chain.0.clone(),
        other => other.as_str().unwrap_or_default().to_string(),
    }
}
