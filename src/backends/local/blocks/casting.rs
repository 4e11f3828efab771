// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet, TypeTag};

/// Converts any value to its textual form.
#[derive(Default)]
pub struct ToStringBlock;

impl Block for ToStringBlock {
    fn name(&self) -> &str {
        "ToString"
    }

    fn input_types(&self) -> TypeSet {
        TypeSet::any()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::of([TypeTag::String])
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        let text = match input {
            TaggedValue::String(text) => text,
            other => other.to_string(),
        };
        Ok(Flow::Continue(TaggedValue::String(text)))
    }
}

/// Converts numbers, booleans and numeric text to floats, keeping the lane count.
#[derive(Default)]
pub struct ToFloatBlock;

impl ToFloatBlock {
    fn accepted() -> TypeSet {
        TypeSet::of([
            TypeTag::Bool,
            TypeTag::Int,
            TypeTag::Int2,
            TypeTag::Int3,
            TypeTag::Int4,
            TypeTag::Float,
            TypeTag::Float2,
            TypeTag::Float3,
            TypeTag::Float4,
            TypeTag::String,
        ])
    }

    fn convert(input: TaggedValue) -> Result<TaggedValue, BlockError> {
        let value = match input {
            TaggedValue::Bool(b) => TaggedValue::Float(if b { 1.0 } else { 0.0 }),
            TaggedValue::Int(v) => TaggedValue::Float(v as f64),
            TaggedValue::Int2(v) => TaggedValue::Float2(v.map(|lane| lane as f64)),
            TaggedValue::Int3(v) => TaggedValue::Float3(v.map(|lane| lane as f32)),
            TaggedValue::Int4(v) => TaggedValue::Float4(v.map(|lane| lane as f32)),
            TaggedValue::String(text) => {
                let parsed = text.trim().parse::<f64>().map_err(|e| {
                    BlockError::Failed(format!("cannot convert '{}' to a float: {}", text, e))
                })?;
                TaggedValue::Float(parsed)
            }
            float @ (TaggedValue::Float(_)
            | TaggedValue::Float2(_)
            | TaggedValue::Float3(_)
            | TaggedValue::Float4(_)) => float,
            other => {
                return Err(BlockError::InvalidInput {
                    expected: Self::accepted(),
                    found: other.tag(),
                })
            }
        };
        Ok(value)
    }
}

impl Block for ToFloatBlock {
    fn name(&self) -> &str {
        "ToFloat"
    }

    fn input_types(&self) -> TypeSet {
        Self::accepted()
    }

    fn output_types(&self) -> TypeSet {
        TypeSet::of([TypeTag::Float, TypeTag::Float2, TypeTag::Float3, TypeTag::Float4])
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Continue(Self::convert(input)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_float_keeps_lane_count() {
        assert_eq!(ToFloatBlock::convert(TaggedValue::Int(3)), Ok(TaggedValue::Float(3.0)));
        assert_eq!(
            ToFloatBlock::convert(TaggedValue::int2(1, -2)),
            Ok(TaggedValue::float2(1.0, -2.0))
        );
        assert_eq!(
            ToFloatBlock::convert(TaggedValue::int4(1, 2, 3, 4)),
            Ok(TaggedValue::float4(1.0, 2.0, 3.0, 4.0))
        );
        assert_eq!(
            ToFloatBlock::convert(TaggedValue::string(" 2.5 ")),
            Ok(TaggedValue::Float(2.5))
        );
    }

    #[test]
    fn test_to_float_rejects_non_numeric() {
        assert!(matches!(
            ToFloatBlock::convert(TaggedValue::string("abc")),
            Err(BlockError::Failed(_))
        ));
        assert!(matches!(
            ToFloatBlock::convert(TaggedValue::color(0, 0, 0, 0)),
            Err(BlockError::InvalidInput { found: TypeTag::Color, .. })
        ));
    }
}
