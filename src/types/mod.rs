// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod tag;
mod tagging;
pub mod store;
pub mod value;

pub use tag::{TypeSet, TypeTag};
pub use tagging::{tag_of, HostValue};
pub use value::{BlockRef, ChainRef, Color, EnumValue, Image, ObjectRef, TaggedValue};
