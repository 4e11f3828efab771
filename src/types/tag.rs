// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of value shapes understood by the engine.
///
/// `Any` is a requirement-only tag: it appears in block input/output and
/// parameter declarations but never as the tag of a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    None,
    Any,
    Object,
    Enum,
    Bool,
    Int,
    Int2,
    Int3,
    Int4,
    Int8,
    Int16,
    Float,
    Float2,
    Float3,
    Float4,
    Color,
    String,
    Image,
    Seq,
    Table,
    Chain,
    Block,
    ContextVar,
}

impl TypeTag {
    pub const ALL: [TypeTag; 23] = [
        TypeTag::None,
        TypeTag::Any,
        TypeTag::Object,
        TypeTag::Enum,
        TypeTag::Bool,
        TypeTag::Int,
        TypeTag::Int2,
        TypeTag::Int3,
        TypeTag::Int4,
        TypeTag::Int8,
        TypeTag::Int16,
        TypeTag::Float,
        TypeTag::Float2,
        TypeTag::Float3,
        TypeTag::Float4,
        TypeTag::Color,
        TypeTag::String,
        TypeTag::Image,
        TypeTag::Seq,
        TypeTag::Table,
        TypeTag::Chain,
        TypeTag::Block,
        TypeTag::ContextVar,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::None => "None",
            TypeTag::Any => "Any",
            TypeTag::Object => "Object",
            TypeTag::Enum => "Enum",
            TypeTag::Bool => "Bool",
            TypeTag::Int => "Int",
            TypeTag::Int2 => "Int2",
            TypeTag::Int3 => "Int3",
            TypeTag::Int4 => "Int4",
            TypeTag::Int8 => "Int8",
            TypeTag::Int16 => "Int16",
            TypeTag::Float => "Float",
            TypeTag::Float2 => "Float2",
            TypeTag::Float3 => "Float3",
            TypeTag::Float4 => "Float4",
            TypeTag::Color => "Color",
            TypeTag::String => "String",
            TypeTag::Image => "Image",
            TypeTag::Seq => "Seq",
            TypeTag::Table => "Table",
            TypeTag::Chain => "Chain",
            TypeTag::Block => "Block",
            TypeTag::ContextVar => "ContextVar",
        }
    }

    /// Lane count for numeric tags, `None` for everything else.
    pub fn lanes(&self) -> Option<usize> {
        match self {
            TypeTag::Int | TypeTag::Float => Some(1),
            TypeTag::Int2 | TypeTag::Float2 => Some(2),
            TypeTag::Int3 | TypeTag::Float3 => Some(3),
            TypeTag::Int4 | TypeTag::Float4 | TypeTag::Color => Some(4),
            TypeTag::Int8 => Some(8),
            TypeTag::Int16 => Some(16),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeTag::Int
                | TypeTag::Int2
                | TypeTag::Int3
                | TypeTag::Int4
                | TypeTag::Int8
                | TypeTag::Int16
                | TypeTag::Float
                | TypeTag::Float2
                | TypeTag::Float3
                | TypeTag::Float4
        )
    }

    /// Integer tag for a tuple of `len` integer lanes.
    pub fn int_for_lanes(len: usize) -> Option<TypeTag> {
        match len {
            1 => Some(TypeTag::Int),
            2 => Some(TypeTag::Int2),
            3 => Some(TypeTag::Int3),
            4 => Some(TypeTag::Int4),
            8 => Some(TypeTag::Int8),
            16 => Some(TypeTag::Int16),
            _ => None,
        }
    }

    /// Float tag for a tuple of `len` float lanes. Floats cap at four lanes.
    pub fn float_for_lanes(len: usize) -> Option<TypeTag> {
        match len {
            1 => Some(TypeTag::Float),
            2 => Some(TypeTag::Float2),
            3 => Some(TypeTag::Float3),
            4 => Some(TypeTag::Float4),
            _ => None,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Newtype wrapper for an ordered, duplicate-free set of type tags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeSet(Vec<TypeTag>);

impl TypeSet {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// The wildcard set `{Any}`
    pub fn any() -> Self {
        Self(vec![TypeTag::Any])
    }

    pub fn of<I: IntoIterator<Item = TypeTag>>(tags: I) -> Self {
        tags.into_iter().collect()
    }

    /// Insert a tag, keeping first-seen order. Returns false if it was present.
    pub fn insert(&mut self, tag: TypeTag) -> bool {
        if self.0.contains(&tag) {
            return false;
        }
        self.0.push(tag);
        true
    }

    pub fn contains(&self, tag: TypeTag) -> bool {
        self.0.contains(&tag)
    }

    /// True if the set contains `Any`
    pub fn is_wildcard(&self) -> bool {
        self.contains(TypeTag::Any)
    }

    /// True if a value tagged `tag` satisfies this requirement set
    pub fn accepts(&self, tag: TypeTag) -> bool {
        self.is_wildcard() || self.contains(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[TypeTag] {
        &self.0
    }
}

impl FromIterator<TypeTag> for TypeSet {
    fn from_iter<I: IntoIterator<Item = TypeTag>>(iter: I) -> Self {
        let mut set = TypeSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl From<Vec<TypeTag>> for TypeSet {
    fn from(tags: Vec<TypeTag>) -> Self {
        tags.into_iter().collect()
    }
}

impl<const N: usize> From<[TypeTag; N]> for TypeSet {
    fn from(tags: [TypeTag; N]) -> Self {
        tags.into_iter().collect()
    }
}

impl fmt::Display for TypeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.0.iter().map(|t| t.name()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}
