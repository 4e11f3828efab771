// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Inference of tagged values from untyped host values.
//!
//! [`tag_of`] is the compatibility path for call sites that only know "a tuple
//! of numbers" or "a list of things". It applies the arity rules in a fixed
//! order and refuses anything it cannot represent exactly:
//!
//! | Host shape | Tag |
//! |------------|-----|
//! | nothing | `None` |
//! | bool / int / float / text | `Bool` / `Int` / `Float` / `String` |
//! | explicit colour `(r, g, b, a)` | `Color` |
//! | tuple with any float, len 1..=4 | `Float`, `Float2`, `Float3`, `Float4` |
//! | tuple of ints, len 1,2,3,4,8,16 | `Int`, `Int2`, `Int3`, `Int4`, `Int8`, `Int16` |
//! | callable | `Object` (callback tokens) |
//! | chain / block handle | `Chain` / `Block` |
//! | sequence | `Seq`, elements tagged recursively |
//! | already tagged | unchanged |
//!
//! A 1-tuple is indistinguishable from a scalar: `(2.5,)` tags as `Float`.

use std::collections::BTreeMap;

use crate::errors::BindingError;
use crate::types::value::{BlockRef, ChainRef, ObjectRef};
use crate::types::{TaggedValue, TypeTag};

/// The closed set of host shapes accepted by [`tag_of`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Built with the explicit colour constructor; bypasses arity inference.
    Color([i64; 4]),
    Tuple(Vec<HostValue>),
    /// Identity of a host callable
    Callable(u64),
    ChainHandle(String),
    BlockHandle(String),
    Sequence(Vec<HostValue>),
    Map(BTreeMap<String, HostValue>),
    Tagged(TaggedValue),
}

impl HostValue {
    pub fn color(r: i64, g: i64, b: i64, a: i64) -> Self {
        HostValue::Color([r, g, b, a])
    }

    pub fn tuple<I: IntoIterator<Item = HostValue>>(items: I) -> Self {
        HostValue::Tuple(items.into_iter().collect())
    }

    fn kind(&self) -> &'static str {
        match self {
            HostValue::None => "none",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Text(_) => "text",
            HostValue::Color(_) => "color",
            HostValue::Tuple(_) => "tuple",
            HostValue::Callable(_) => "callable",
            HostValue::ChainHandle(_) => "chain",
            HostValue::BlockHandle(_) => "block",
            HostValue::Sequence(_) => "sequence",
            HostValue::Map(_) => "map",
            HostValue::Tagged(_) => "tagged value",
        }
    }
}

fn unrepresentable(reason: impl Into<String>) -> BindingError {
    BindingError::UnrepresentableValue {
        reason: reason.into(),
    }
}

/// Convert a host value into a tagged engine value.
pub fn tag_of(value: HostValue) -> Result<TaggedValue, BindingError> {
    match value {
        HostValue::None => Ok(TaggedValue::None),
        HostValue::Bool(b) => Ok(TaggedValue::Bool(b)),
        HostValue::Int(i) => Ok(TaggedValue::Int(i)),
        HostValue::Float(f) => Ok(TaggedValue::Float(f)),
        HostValue::Text(s) => Ok(TaggedValue::String(s)),
        HostValue::Color(lanes) => tag_color(lanes),
        HostValue::Tuple(items) => tag_tuple(items),
        HostValue::Callable(id) => Ok(TaggedValue::Object(ObjectRef::callback(id))),
        HostValue::ChainHandle(name) => Ok(TaggedValue::Chain(ChainRef(name))),
        HostValue::BlockHandle(name) => Ok(TaggedValue::Block(BlockRef(name))),
        HostValue::Sequence(items) => items
            .into_iter()
            .map(tag_of)
            .collect::<Result<Vec<_>, _>>()
            .map(TaggedValue::Seq),
        HostValue::Map(entries) => entries
            .into_iter()
            .map(|(k, v)| tag_of(v).map(|v| (k, v)))
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(TaggedValue::Table),
        HostValue::Tagged(tagged) => Ok(tagged),
    }
}

fn tag_color(lanes: [i64; 4]) -> Result<TaggedValue, BindingError> {
    let mut bytes = [0u8; 4];
    for (i, lane) in lanes.iter().enumerate() {
        bytes[i] = u8::try_from(*lane)
            .map_err(|_| unrepresentable(format!("color lane {} is {}, expected 0..=255", i, lane)))?;
    }
    Ok(TaggedValue::color(bytes[0], bytes[1], bytes[2], bytes[3]))
}

enum Lane {
    Int(i64),
    Float(f64),
}

fn tag_tuple(items: Vec<HostValue>) -> Result<TaggedValue, BindingError> {
    let mut lanes = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        match item {
            HostValue::Int(v) => lanes.push(Lane::Int(*v)),
            HostValue::Float(v) => lanes.push(Lane::Float(*v)),
            other => {
                return Err(unrepresentable(format!(
                    "tuple element {} is a {}, only ints and floats can form a vector",
                    i,
                    other.kind()
                )))
            }
        }
    }

    if lanes.iter().any(|l| matches!(l, Lane::Float(_))) {
        let floats = lanes
            .iter()
            .map(|l| match l {
                Lane::Int(v) => promote(*v),
                Lane::Float(v) => Ok(*v),
            })
            .collect::<Result<Vec<f64>, _>>()?;
        return float_vector(&floats);
    }

    let ints: Vec<i64> = lanes
        .iter()
        .filter_map(|l| match l {
            Lane::Int(v) => Some(*v),
            Lane::Float(_) => None,
        })
        .collect();
    int_vector(&ints)
}

/// Integer lane promoted into a float tuple; it must survive the trip exactly.
fn promote(v: i64) -> Result<f64, BindingError> {
    let promoted = v as f64;
    if promoted as i128 != i128::from(v) {
        return Err(unrepresentable(format!("{} loses precision as a float lane", v)));
    }
    Ok(promoted)
}

fn float_vector(floats: &[f64]) -> Result<TaggedValue, BindingError> {
    let tag = TypeTag::float_for_lanes(floats.len()).ok_or_else(|| {
        unrepresentable(format!("float tuple of length {} (floats cap at 4 lanes)", floats.len()))
    })?;

    match tag {
        TypeTag::Float => Ok(TaggedValue::Float(floats[0])),
        TypeTag::Float2 => Ok(TaggedValue::float2(floats[0], floats[1])),
        TypeTag::Float3 => {
            let l = narrow_f32(floats)?;
            Ok(TaggedValue::float3(l[0], l[1], l[2]))
        }
        _ => {
            let l = narrow_f32(floats)?;
            Ok(TaggedValue::float4(l[0], l[1], l[2], l[3]))
        }
    }
}

fn narrow_f32(floats: &[f64]) -> Result<Vec<f32>, BindingError> {
    floats
        .iter()
        .map(|v| {
            let narrowed = *v as f32;
            if v.is_finite() && !narrowed.is_finite() {
                Err(unrepresentable(format!("{} overflows a 32-bit float lane", v)))
            } else {
                Ok(narrowed)
            }
        })
        .collect()
}

fn narrow_lanes<T: TryFrom<i64>>(ints: &[i64], lane_bits: u32) -> Result<Vec<T>, BindingError> {
    ints.iter()
        .map(|v| {
            T::try_from(*v)
                .map_err(|_| unrepresentable(format!("{} does not fit a {}-bit integer lane", v, lane_bits)))
        })
        .collect()
}

fn int_vector(ints: &[i64]) -> Result<TaggedValue, BindingError> {
    let tag = TypeTag::int_for_lanes(ints.len()).ok_or_else(|| {
        unrepresentable(format!(
            "integer tuple of length {} (valid lengths are 1, 2, 3, 4, 8, 16)",
            ints.len()
        ))
    })?;

    let value = match tag {
        TypeTag::Int => TaggedValue::Int(ints[0]),
        TypeTag::Int2 => TaggedValue::int2(ints[0], ints[1]),
        TypeTag::Int3 => {
            let l: Vec<i32> = narrow_lanes(ints, 32)?;
            TaggedValue::int3(l[0], l[1], l[2])
        }
        TypeTag::Int4 => {
            let l: Vec<i32> = narrow_lanes(ints, 32)?;
            TaggedValue::int4(l[0], l[1], l[2], l[3])
        }
        TypeTag::Int8 => {
            let l: Vec<i16> = narrow_lanes(ints, 16)?;
            let mut lanes = [0i16; 8];
            lanes.copy_from_slice(&l);
            TaggedValue::Int8(lanes)
        }
        _ => {
            let l: Vec<i8> = narrow_lanes(ints, 8)?;
            let mut lanes = [0i8; 16];
            lanes.copy_from_slice(&l);
            TaggedValue::Int16(lanes)
        }
    };
    Ok(value)
}

impl From<()> for HostValue {
    fn from(_: ()) -> Self {
        HostValue::None
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<i64> for HostValue {
    fn from(v: i64) -> Self {
        HostValue::Int(v)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Int(v as i64)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Float(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Float(v as f64)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::Text(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::Text(v)
    }
}

impl From<TaggedValue> for HostValue {
    fn from(v: TaggedValue) -> Self {
        HostValue::Tagged(v)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(HostValue::None)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<HostValue>, const N: usize> From<[T; N]> for HostValue {
    fn from(items: [T; N]) -> Self {
        HostValue::Tuple(items.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<HostValue>, B: Into<HostValue>> From<(A, B)> for HostValue {
    fn from((a, b): (A, B)) -> Self {
        HostValue::Tuple(vec![a.into(), b.into()])
    }
}

impl<A: Into<HostValue>, B: Into<HostValue>, C: Into<HostValue>> From<(A, B, C)> for HostValue {
    fn from((a, b, c): (A, B, C)) -> Self {
        HostValue::Tuple(vec![a.into(), b.into(), c.into()])
    }
}

impl<A, B, C, D> From<(A, B, C, D)> for HostValue
where
    A: Into<HostValue>,
    B: Into<HostValue>,
    C: Into<HostValue>,
    D: Into<HostValue>,
{
    fn from((a, b, c, d): (A, B, C, D)) -> Self {
        HostValue::Tuple(vec![a.into(), b.into(), c.into(), d.into()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_tuple(len: usize) -> HostValue {
        HostValue::tuple((0..len as i64).map(HostValue::Int))
    }

    fn float_tuple(len: usize) -> HostValue {
        HostValue::tuple((0..len).map(|i| HostValue::Float(i as f64 + 0.5)))
    }

    #[test]
    fn test_integer_tuple_arity_table() {
        let expected = [
            (1, TypeTag::Int),
            (2, TypeTag::Int2),
            (3, TypeTag::Int3),
            (4, TypeTag::Int4),
            (8, TypeTag::Int8),
            (16, TypeTag::Int16),
        ];
        for (len, tag) in expected {
            let value = tag_of(int_tuple(len)).expect("valid arity");
            assert_eq!(value.tag(), tag, "length {}", len);
        }

        for len in [0, 5, 6, 7, 9, 10, 11, 12, 13, 14, 15, 17] {
            let err = tag_of(int_tuple(len)).unwrap_err();
            assert!(
                matches!(err, BindingError::UnrepresentableValue { .. }),
                "length {} should be rejected",
                len
            );
        }
    }

    #[test]
    fn test_float_tuple_arity_table() {
        let expected = [
            (1, TypeTag::Float),
            (2, TypeTag::Float2),
            (3, TypeTag::Float3),
            (4, TypeTag::Float4),
        ];
        for (len, tag) in expected {
            assert_eq!(tag_of(float_tuple(len)).unwrap().tag(), tag);
        }

        for len in [5, 8, 16] {
            assert!(tag_of(float_tuple(len)).is_err(), "length {}", len);
        }
    }

    #[test]
    fn test_single_float_tuple_is_a_scalar() {
        let tuple = tag_of(HostValue::tuple([HostValue::Float(2.5)])).unwrap();
        let scalar = tag_of(HostValue::Float(2.5)).unwrap();
        assert_eq!(tuple, scalar);
    }

    #[test]
    fn test_any_float_promotes_the_tuple() {
        let value = tag_of((1, 2.5, 3).into()).unwrap();
        assert_eq!(value, TaggedValue::float3(1.0, 2.5, 3.0));
    }

    #[test]
    fn test_promotion_rejects_ints_a_float_cannot_hold() {
        let exact = 1i64 << 53;
        assert_eq!(
            tag_of((exact, 0.5).into()).unwrap(),
            TaggedValue::float2(exact as f64, 0.5)
        );

        for lossy in [exact + 1, i64::MAX] {
            assert!(matches!(
                tag_of((lossy, 0.5).into()),
                Err(BindingError::UnrepresentableValue { .. })
            ));
        }
    }

    #[test]
    fn test_mixed_non_numeric_tuple_is_rejected() {
        let err = tag_of(HostValue::tuple([HostValue::Int(1), HostValue::Text("x".into())])).unwrap_err();
        assert!(err.to_string().contains("text"));
    }

    #[test]
    fn test_lane_overflow_is_rejected_not_truncated() {
        let mut lanes: Vec<HostValue> = (0..16).map(|_| HostValue::Int(1)).collect();
        lanes[3] = HostValue::Int(300);
        assert!(tag_of(HostValue::Tuple(lanes)).is_err());

        let wide = HostValue::tuple([HostValue::Int(i64::MAX), HostValue::Int(0), HostValue::Int(0)]);
        assert!(tag_of(wide).is_err());

        let too_big = HostValue::tuple([HostValue::Float(1e300), HostValue::Float(0.0), HostValue::Float(0.0)]);
        assert!(tag_of(too_big).is_err());
    }

    #[test]
    fn test_color_constructor() {
        assert_eq!(
            tag_of(HostValue::color(255, 128, 0, 255)).unwrap(),
            TaggedValue::color(255, 128, 0, 255)
        );
        assert!(tag_of(HostValue::color(256, 0, 0, 0)).is_err());
        assert!(tag_of(HostValue::color(-1, 0, 0, 0)).is_err());

        // Without the constructor, four small ints are a plain Int4.
        assert_eq!(tag_of((255, 128, 0, 255).into()).unwrap().tag(), TypeTag::Int4);
    }

    #[test]
    fn test_scalars_handles_and_callables() {
        assert_eq!(tag_of(HostValue::None).unwrap(), TaggedValue::None);
        assert_eq!(tag_of(true.into()).unwrap(), TaggedValue::Bool(true));
        assert_eq!(tag_of(7i64.into()).unwrap(), TaggedValue::Int(7));
        assert_eq!(tag_of("hi".into()).unwrap(), TaggedValue::string("hi"));
        assert_eq!(
            tag_of(HostValue::ChainHandle("loop".into())).unwrap(),
            TaggedValue::chain("loop")
        );
        assert_eq!(
            tag_of(HostValue::BlockHandle("Math.Add".into())).unwrap(),
            TaggedValue::block("Math.Add")
        );

        match tag_of(HostValue::Callable(99)).unwrap() {
            TaggedValue::Object(obj) => {
                assert_eq!(obj.id, 99);
                assert!(obj.is_callback());
            }
            other => panic!("expected Object, got {:?}", other),
        }
    }

    #[test]
    fn test_sequences_tag_recursively() {
        let seq: HostValue = vec![HostValue::Int(1), (1.0, 2.0).into(), "x".into()].into();
        assert_eq!(
            tag_of(seq).unwrap(),
            TaggedValue::Seq(vec![
                TaggedValue::Int(1),
                TaggedValue::float2(1.0, 2.0),
                TaggedValue::string("x"),
            ])
        );

        let bad: HostValue = vec![HostValue::Int(1), int_tuple(5)].into();
        assert!(tag_of(bad).is_err());
    }

    #[test]
    fn test_retagging_is_idempotent() {
        let original = TaggedValue::int3(1, 2, 3);
        let once = tag_of(original.clone().into()).unwrap();
        let twice = tag_of(once.clone().into()).unwrap();
        assert_eq!(once, original);
        assert_eq!(twice, original);
    }
}
