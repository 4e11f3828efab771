// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tagged engine values.
//!
//! [`TaggedValue`] is the tagged union the engine consumes. Every variant fixes
//! the shape of its payload, so a value's tag is always derivable from the value
//! itself and there is no variant for the `Any` wildcard.
//!
//! Typed call sites should use the explicit constructors (`TaggedValue::int2`,
//! `TaggedValue::float3`, `TaggedValue::color`, ...). Untyped call sites go
//! through [`crate::types::tag_of`], which reproduces the arity inference table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::errors::BindingError;
use crate::types::TypeTag;

/// Vendor token carried by host callback objects ('frag').
pub const CORE_VENDOR_ID: u32 = u32::from_be_bytes(*b"frag");
/// Type token carried by host callback objects ('hcbk').
pub const CALLBACK_TYPE_ID: u32 = u32::from_be_bytes(*b"hcbk");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Opaque host reference with the two tokens the engine checks before calling back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: u64,
    pub vendor_id: u32,
    pub type_id: u32,
}

impl ObjectRef {
    /// A host callback, stamped with the core callback tokens
    pub fn callback(id: u64) -> Self {
        Self {
            id,
            vendor_id: CORE_VENDOR_ID,
            type_id: CALLBACK_TYPE_ID,
        }
    }

    pub fn is_callback(&self) -> bool {
        self.vendor_id == CORE_VENDOR_ID && self.type_id == CALLBACK_TYPE_ID
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub vendor_id: u32,
    pub type_id: u32,
    pub value: i32,
}

/// Raw pixel buffer. `data.len()` is always `width * height * channels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub width: u16,
    pub height: u16,
    pub channels: u8,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Image {
    pub fn new(width: u16, height: u16, channels: u8, data: Vec<u8>) -> Result<Self, BindingError> {
        let image = Self {
            width,
            height,
            channels,
            data,
        };
        image.validate()?;
        Ok(image)
    }

    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    pub fn validate(&self) -> Result<(), BindingError> {
        if self.data.len() != self.expected_len() {
            return Err(BindingError::UnrepresentableValue {
                reason: format!(
                    "image {}x{}x{} needs {} bytes, got {}",
                    self.width,
                    self.height,
                    self.channels,
                    self.expected_len(),
                    self.data.len()
                ),
            });
        }
        Ok(())
    }
}

/// A chain referenced by name, e.g. as the target of `WaitChain`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainRef(pub String);

/// A block referenced by its (possibly namespaced) name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef(pub String);

/// A `(tag, payload)` pair understood by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum TaggedValue {
    #[default]
    None,
    Object(ObjectRef),
    Enum(EnumValue),
    Bool(bool),
    Int(i64),
    Int2([i64; 2]),
    Int3([i32; 3]),
    Int4([i32; 4]),
    Int8([i16; 8]),
    Int16([i8; 16]),
    Float(f64),
    Float2([f64; 2]),
    Float3([f32; 3]),
    Float4([f32; 4]),
    Color(Color),
    String(String),
    Image(Image),
    Seq(Vec<TaggedValue>),
    Table(BTreeMap<String, TaggedValue>),
    Chain(ChainRef),
    Block(BlockRef),
    ContextVar(String),
}

impl TaggedValue {
    pub fn tag(&self) -> TypeTag {
        match self {
            TaggedValue::None => TypeTag::None,
            TaggedValue::Object(_) => TypeTag::Object,
            TaggedValue::Enum(_) => TypeTag::Enum,
            TaggedValue::Bool(_) => TypeTag::Bool,
            TaggedValue::Int(_) => TypeTag::Int,
            TaggedValue::Int2(_) => TypeTag::Int2,
            TaggedValue::Int3(_) => TypeTag::Int3,
            TaggedValue::Int4(_) => TypeTag::Int4,
            TaggedValue::Int8(_) => TypeTag::Int8,
            TaggedValue::Int16(_) => TypeTag::Int16,
            TaggedValue::Float(_) => TypeTag::Float,
            TaggedValue::Float2(_) => TypeTag::Float2,
            TaggedValue::Float3(_) => TypeTag::Float3,
            TaggedValue::Float4(_) => TypeTag::Float4,
            TaggedValue::Color(_) => TypeTag::Color,
            TaggedValue::String(_) => TypeTag::String,
            TaggedValue::Image(_) => TypeTag::Image,
            TaggedValue::Seq(_) => TypeTag::Seq,
            TaggedValue::Table(_) => TypeTag::Table,
            TaggedValue::Chain(_) => TypeTag::Chain,
            TaggedValue::Block(_) => TypeTag::Block,
            TaggedValue::ContextVar(_) => TypeTag::ContextVar,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TaggedValue::None)
    }

    pub fn int2(x: i64, y: i64) -> Self {
        TaggedValue::Int2([x, y])
    }

    pub fn int3(x: i32, y: i32, z: i32) -> Self {
        TaggedValue::Int3([x, y, z])
    }

    pub fn int4(x: i32, y: i32, z: i32, w: i32) -> Self {
        TaggedValue::Int4([x, y, z, w])
    }

    pub fn int8(lanes: [i16; 8]) -> Self {
        TaggedValue::Int8(lanes)
    }

    pub fn int16(lanes: [i8; 16]) -> Self {
        TaggedValue::Int16(lanes)
    }

    pub fn float2(x: f64, y: f64) -> Self {
        TaggedValue::Float2([x, y])
    }

    pub fn float3(x: f32, y: f32, z: f32) -> Self {
        TaggedValue::Float3([x, y, z])
    }

    pub fn float4(x: f32, y: f32, z: f32, w: f32) -> Self {
        TaggedValue::Float4([x, y, z, w])
    }

    pub fn color(r: u8, g: u8, b: u8, a: u8) -> Self {
        TaggedValue::Color(Color { r, g, b, a })
    }

    pub fn string(text: impl Into<String>) -> Self {
        TaggedValue::String(text.into())
    }

    pub fn image(width: u16, height: u16, channels: u8, data: Vec<u8>) -> Result<Self, BindingError> {
        Image::new(width, height, channels, data).map(TaggedValue::Image)
    }

    pub fn enumeration(vendor_id: u32, type_id: u32, value: i32) -> Self {
        TaggedValue::Enum(EnumValue {
            vendor_id,
            type_id,
            value,
        })
    }

    pub fn object(id: u64, vendor_id: u32, type_id: u32) -> Self {
        TaggedValue::Object(ObjectRef {
            id,
            vendor_id,
            type_id,
        })
    }

    pub fn chain(name: impl Into<String>) -> Self {
        TaggedValue::Chain(ChainRef(name.into()))
    }

    pub fn block(name: impl Into<String>) -> Self {
        TaggedValue::Block(BlockRef(name.into()))
    }

    pub fn context_var(name: impl Into<String>) -> Self {
        TaggedValue::ContextVar(name.into())
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            TaggedValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric scalar as f64, accepting both `Int` and `Float`
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TaggedValue::Int(v) => Some(*v as f64),
            TaggedValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            TaggedValue::String(s) | TaggedValue::ContextVar(s) => Some(s),
            _ => None,
        }
    }

    /// Recursively check payload invariants that the type system cannot express.
    pub fn validate(&self) -> Result<(), BindingError> {
        match self {
            TaggedValue::Image(image) => image.validate(),
            TaggedValue::Seq(items) => items.iter().try_for_each(TaggedValue::validate),
            TaggedValue::Table(entries) => entries.values().try_for_each(TaggedValue::validate),
            _ => Ok(()),
        }
    }
}

fn write_lanes<T: fmt::Display>(f: &mut fmt::Formatter<'_>, lanes: &[T]) -> fmt::Result {
    write!(f, "(")?;
    for (i, lane) in lanes.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", lane)?;
    }
    write!(f, ")")
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggedValue::None => write!(f, "None"),
            TaggedValue::Object(o) => write!(f, "Object({})", o.id),
            TaggedValue::Enum(e) => write!(f, "Enum({})", e.value),
            TaggedValue::Bool(b) => write!(f, "{}", b),
            TaggedValue::Int(v) => write!(f, "{}", v),
            TaggedValue::Int2(v) => write_lanes(f, v),
            TaggedValue::Int3(v) => write_lanes(f, v),
            TaggedValue::Int4(v) => write_lanes(f, v),
            TaggedValue::Int8(v) => write_lanes(f, v),
            TaggedValue::Int16(v) => write_lanes(f, v),
            TaggedValue::Float(v) => write!(f, "{}", v),
            TaggedValue::Float2(v) => write_lanes(f, v),
            TaggedValue::Float3(v) => write_lanes(f, v),
            TaggedValue::Float4(v) => write_lanes(f, v),
            TaggedValue::Color(c) => write!(f, "Color({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            TaggedValue::String(s) => write!(f, "{}", s),
            TaggedValue::Image(i) => write!(f, "Image({}x{}x{})", i.width, i.height, i.channels),
            TaggedValue::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            TaggedValue::Table(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            TaggedValue::Chain(c) => write!(f, "Chain({})", c.0),
            TaggedValue::Block(b) => write!(f, "Block({})", b.0),
            TaggedValue::ContextVar(name) => write!(f, "${}", name),
        }
    }
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_constructors_carry_their_tag() {
        let cases = vec![
            (TaggedValue::int2(1, 2), TypeTag::Int2),
            (TaggedValue::int3(1, 2, 3), TypeTag::Int3),
            (TaggedValue::int4(1, 2, 3, 4), TypeTag::Int4),
            (TaggedValue::int8([0; 8]), TypeTag::Int8),
            (TaggedValue::int16([0; 16]), TypeTag::Int16),
            (TaggedValue::float2(1.0, 2.0), TypeTag::Float2),
            (TaggedValue::float3(1.0, 2.0, 3.0), TypeTag::Float3),
            (TaggedValue::float4(1.0, 2.0, 3.0, 4.0), TypeTag::Float4),
            (TaggedValue::color(255, 0, 0, 255), TypeTag::Color),
            (TaggedValue::string("hi"), TypeTag::String),
            (TaggedValue::chain("main"), TypeTag::Chain),
            (TaggedValue::block("Math.Add"), TypeTag::Block),
            (TaggedValue::context_var("x"), TypeTag::ContextVar),
            (TaggedValue::None, TypeTag::None),
        ];

        for (value, expected) in cases {
            assert_eq!(value.tag(), expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_no_value_is_tagged_any() {
        let values = vec![
            TaggedValue::None,
            TaggedValue::Bool(true),
            TaggedValue::Seq(vec![TaggedValue::Int(1)]),
            TaggedValue::Table(BTreeMap::new()),
        ];
        assert!(values.iter().all(|v| v.tag() != TypeTag::Any));
    }

    #[test]
    fn test_image_length_is_checked() {
        assert!(TaggedValue::image(2, 2, 3, vec![0; 12]).is_ok());

        let err = TaggedValue::image(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, BindingError::UnrepresentableValue { .. }));
    }

    #[test]
    fn test_callback_object_tokens() {
        let obj = ObjectRef::callback(42);
        assert!(obj.is_callback());
        assert_eq!(obj.vendor_id.to_be_bytes(), *b"frag");
        assert!(!ObjectRef { id: 42, vendor_id: 1, type_id: 2 }.is_callback());
    }

    #[test]
    fn test_display() {
        assert_eq!(TaggedValue::int3(1, 2, 3).to_string(), "(1, 2, 3)");
        assert_eq!(TaggedValue::string("abc").to_string(), "abc");
        assert_eq!(
            TaggedValue::Seq(vec![TaggedValue::Int(1), TaggedValue::Bool(false)]).to_string(),
            "[1, false]"
        );
    }
}
