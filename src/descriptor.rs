// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cached type and parameter descriptors for blocks.
//!
//! A block's declared inputs, outputs and parameters are read once, the first
//! time a block of that name is created, and shared read-only by every later
//! instance through the [`DescriptorCache`].

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::observability::messages::{binding::DescriptorCached, StructuredLog};
use crate::traits::Block;
use crate::types::TypeSet;

/// Identifiers that cannot be used verbatim as generated Rust names.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum", "extern",
    "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move", "mut", "pub",
    "ref", "return", "self", "static", "struct", "super", "trait", "true", "type", "unsafe", "use",
    "where", "while", "abstract", "become", "box", "do", "final", "gen", "macro", "override",
    "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Escape a name that collides (case-insensitively) with a reserved identifier
/// by appending `_`, e.g. `Type` becomes `Type_`.
pub fn escape_identifier(name: &str) -> String {
    let lowered = name.to_ascii_lowercase();
    if RESERVED_IDENTIFIERS.contains(&lowered.as_str()) {
        format!("{}_", name)
    } else {
        name.to_string()
    }
}

/// One configurable slot on a block
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub help: String,
    pub types: TypeSet,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, types: impl Into<TypeSet>) -> Self {
        Self {
            name: name.into(),
            help: String::new(),
            types: types.into(),
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Lower-cased, escaped name used by generated stubs and named setters
    pub fn binding_name(&self) -> String {
        escape_identifier(&self.name.to_ascii_lowercase())
    }
}

/// Everything the binding layer knows about a block name.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDescriptor {
    pub name: String,
    pub input_types: TypeSet,
    pub output_types: TypeSet,
    pub parameters: Vec<ParameterDescriptor>,
}

impl BlockDescriptor {
    pub fn introspect(block: &dyn Block) -> Self {
        Self {
            name: block.name().to_string(),
            input_types: block.input_types(),
            output_types: block.output_types(),
            parameters: block.parameters(),
        }
    }

    /// `Some("Math")` for `"Math.Add"`, `None` for `"Log"`
    pub fn namespace(&self) -> Option<&str> {
        self.name.rsplit_once('.').map(|(ns, _)| ns)
    }

    /// `"Add"` for `"Math.Add"`
    pub fn short_name(&self) -> &str {
        self.name.rsplit_once('.').map(|(_, short)| short).unwrap_or(&self.name)
    }

    /// Resolve a parameter by its raw or binding name, ignoring case.
    pub fn parameter_index(&self, name: &str) -> Option<usize> {
        self.parameters.iter().position(|p| {
            p.name.eq_ignore_ascii_case(name) || p.binding_name().eq_ignore_ascii_case(name)
        })
    }
}

/// Shared cache of block descriptors keyed by block name
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<String, Arc<BlockDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Arc<BlockDescriptor>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(name)
            .cloned()
    }

    /// Return the cached descriptor for `block`'s name, introspecting it on first use.
    pub fn get_or_introspect(&self, block: &dyn Block) -> Arc<BlockDescriptor> {
        if let Some(found) = self.get(block.name()) {
            return found;
        }

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries
            .entry(block.name().to_string())
            .or_insert_with(|| {
                let descriptor = BlockDescriptor::introspect(block);
                DescriptorCached {
                    name: &descriptor.name,
                    inputs: &descriptor.input_types,
                    outputs: &descriptor.output_types,
                }
                .log();
                Arc::new(descriptor)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
