// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lane-wise arithmetic over scalar and vector numbers.
//!
//! Input and `Operand` must carry the same tag. Integer arithmetic is checked:
//! overflow and division by zero fail the block. Float arithmetic follows IEEE
//! rules.

use super::check_param;
use crate::descriptor::ParameterDescriptor;
use crate::errors::BlockError;
use crate::node::ActivationContext;
use crate::traits::{Block, Flow};
use crate::types::{TaggedValue, TypeSet, TypeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl MathOp {
    pub const ALL: [MathOp; 4] = [MathOp::Add, MathOp::Subtract, MathOp::Multiply, MathOp::Divide];

    pub fn block_name(self) -> &'static str {
        match self {
            MathOp::Add => "Math.Add",
            MathOp::Subtract => "Math.Subtract",
            MathOp::Multiply => "Math.Multiply",
            MathOp::Divide => "Math.Divide",
        }
    }

    fn int(self, a: i64, b: i64) -> Result<i64, BlockError> {
        let result = match self {
            MathOp::Add => a.checked_add(b),
            MathOp::Subtract => a.checked_sub(b),
            MathOp::Multiply => a.checked_mul(b),
            MathOp::Divide => {
                if b == 0 {
                    return Err(BlockError::DivisionByZero);
                }
                a.checked_div(b)
            }
        };
        result.ok_or_else(|| BlockError::Failed(format!("integer overflow in {}", self.block_name())))
    }

    fn narrow(self, a: i32, b: i32) -> Result<i32, BlockError> {
        let wide = self.int(a as i64, b as i64)?;
        i32::try_from(wide)
            .map_err(|_| BlockError::Failed(format!("integer overflow in {}", self.block_name())))
    }

    fn float(self, a: f64, b: f64) -> f64 {
        match self {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide => a / b,
        }
    }

    fn float32(self, a: f32, b: f32) -> f32 {
        match self {
            MathOp::Add => a + b,
            MathOp::Subtract => a - b,
            MathOp::Multiply => a * b,
            MathOp::Divide => a / b,
        }
    }
}

fn lanes<T: Copy, const N: usize>(
    a: [T; N],
    b: [T; N],
    f: impl Fn(T, T) -> Result<T, BlockError>,
) -> Result<[T; N], BlockError> {
    let mut out = a;
    for (slot, (x, y)) in out.iter_mut().zip(a.into_iter().zip(b)) {
        *slot = f(x, y)?;
    }
    Ok(out)
}

fn numeric_types() -> TypeSet {
    TypeSet::of([
        TypeTag::Int,
        TypeTag::Int2,
        TypeTag::Int3,
        TypeTag::Int4,
        TypeTag::Float,
        TypeTag::Float2,
        TypeTag::Float3,
        TypeTag::Float4,
    ])
}

pub struct MathBlock {
    op: MathOp,
    operand: TaggedValue,
}

impl MathBlock {
    pub fn new(op: MathOp) -> Self {
        Self {
            op,
            operand: TaggedValue::None,
        }
    }

    fn apply(&self, input: TaggedValue) -> Result<TaggedValue, BlockError> {
        let op = self.op;
        let value = match (input, &self.operand) {
            (TaggedValue::Int(a), TaggedValue::Int(b)) => TaggedValue::Int(op.int(a, *b)?),
            (TaggedValue::Int2(a), TaggedValue::Int2(b)) => {
                TaggedValue::Int2(lanes(a, *b, |x, y| op.int(x, y))?)
            }
            (TaggedValue::Int3(a), TaggedValue::Int3(b)) => {
                TaggedValue::Int3(lanes(a, *b, |x, y| op.narrow(x, y))?)
            }
            (TaggedValue::Int4(a), TaggedValue::Int4(b)) => {
                TaggedValue::Int4(lanes(a, *b, |x, y| op.narrow(x, y))?)
            }
            (TaggedValue::Float(a), TaggedValue::Float(b)) => TaggedValue::Float(op.float(a, *b)),
            (TaggedValue::Float2(a), TaggedValue::Float2(b)) => {
                TaggedValue::Float2(lanes(a, *b, |x, y| Ok(op.float(x, y)))?)
            }
            (TaggedValue::Float3(a), TaggedValue::Float3(b)) => {
                TaggedValue::Float3(lanes(a, *b, |x, y| Ok(op.float32(x, y)))?)
            }
            (TaggedValue::Float4(a), TaggedValue::Float4(b)) => {
                TaggedValue::Float4(lanes(a, *b, |x, y| Ok(op.float32(x, y)))?)
            }
            (_, TaggedValue::None) => {
                return Err(BlockError::Failed(format!(
                    "{} has no operand",
                    op.block_name()
                )))
            }
            (other, operand) => {
                return Err(BlockError::InvalidInput {
                    expected: TypeSet::of([operand.tag()]),
                    found: other.tag(),
                })
            }
        };
        Ok(value)
    }
}

impl Block for MathBlock {
    fn name(&self) -> &str {
        self.op.block_name()
    }

    fn input_types(&self) -> TypeSet {
        numeric_types()
    }

    fn output_types(&self) -> TypeSet {
        numeric_types()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        vec![ParameterDescriptor::new("Operand", numeric_types())
            .with_help("The right-hand operand; must have the same type as the input.")]
    }

    fn set_param(&mut self, index: usize, value: TaggedValue) -> Result<(), BlockError> {
        check_param(&self.parameters(), index, &value)?;
        self.operand = value;
        Ok(())
    }

    fn get_param(&self, index: usize) -> Option<TaggedValue> {
        (index == 0).then(|| self.operand.clone())
    }

    fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
        Ok(Flow::Continue(self.apply(input)?))
    }
}
