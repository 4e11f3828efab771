// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Typed constructor stubs generated from engine reflection.
//!
//! One pass over every block name the engine reports produces Rust source with
//! one function per block. Namespaced blocks (`Math.Add`) land in a module per
//! namespace (`math::add`). Parameters become `Option<HostValue>` arguments
//! named by their binding names, so reserved words come out escaped.

use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;

use crate::bindings::Bindings;
use crate::descriptor::{escape_identifier, BlockDescriptor};
use crate::errors::BindingError;

/// `ChainStop` → `chain_stop`, `ToFloat` → `to_float`, `RGBToHex` → `rgb_to_hex`
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_ascii_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_ascii_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_ascii_uppercase() => next.is_some_and(|n| n.is_ascii_lowercase()),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else if c.is_ascii_alphanumeric() {
            out.push(c);
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out
}

/// Function name emitted for a block
pub fn function_name(descriptor: &BlockDescriptor) -> String {
    escape_identifier(&snake_case(descriptor.short_name()))
}

pub struct StubGenerator<'a> {
    bindings: &'a Bindings,
}

impl<'a> StubGenerator<'a> {
    pub fn new(bindings: &'a Bindings) -> Self {
        Self { bindings }
    }

    pub fn generate(&self) -> Result<String, BindingError> {
        let descriptors = self.bindings.descriptors()?;
        Ok(render(&descriptors))
    }
}

fn render(descriptors: &[Arc<BlockDescriptor>]) -> String {
    let mut root: Vec<&BlockDescriptor> = Vec::new();
    let mut namespaces: BTreeMap<String, Vec<&BlockDescriptor>> = BTreeMap::new();
    for descriptor in descriptors {
        match descriptor.namespace() {
            Some(ns) => namespaces.entry(ns.to_string()).or_default().push(descriptor),
            None => root.push(descriptor),
        }
    }

    let mut out = String::new();
    out.push_str("// Generated block constructors. Do not edit.\n\n");
    out.push_str("use the_chainwright::bindings::{BlockHandle, Bindings};\n");
    out.push_str("use the_chainwright::errors::BindingError;\n");
    out.push_str("use the_chainwright::types::HostValue;\n");

    for descriptor in root {
        out.push('\n');
        render_function(&mut out, descriptor, "");
    }

    for (namespace, members) in namespaces {
        let module = escape_identifier(&snake_case(&namespace).replace('.', "_"));
        let _ = write!(out, "\npub mod {} {{\n    use super::*;\n", module);
        for descriptor in members {
            out.push('\n');
            render_function(&mut out, descriptor, "    ");
        }
        out.push_str("}\n");
    }

    out
}

fn render_function(out: &mut String, descriptor: &BlockDescriptor, indent: &str) {
    let _ = writeln!(
        out,
        "{}/// `{}`: {} -> {}",
        indent, descriptor.name, descriptor.input_types, descriptor.output_types
    );
    if !descriptor.parameters.is_empty() {
        let _ = writeln!(out, "{}///", indent);
        for parameter in &descriptor.parameters {
            let help = if parameter.help.is_empty() {
                String::new()
            } else {
                format!(" {}", parameter.help)
            };
            let _ = writeln!(
                out,
                "{}/// * `{}` {}{}",
                indent,
                parameter.binding_name(),
                parameter.types,
                help
            );
        }
    }

    let mut arguments = vec!["bindings: &Bindings".to_string()];
    arguments.extend(
        descriptor
            .parameters
            .iter()
            .map(|p| format!("{}: Option<HostValue>", p.binding_name())),
    );

    let _ = writeln!(
        out,
        "{}pub fn {}({}) -> Result<BlockHandle, BindingError> {{",
        indent,
        function_name(descriptor),
        arguments.join(", ")
    );
    let _ = write!(out, "{}    bindings\n{}        .block({:?})\n", indent, indent, descriptor.name);
    for parameter in &descriptor.parameters {
        let _ = writeln!(
            out,
            "{}        .maybe_param({:?}, {})",
            indent,
            parameter.name,
            parameter.binding_name()
        );
    }
    let _ = writeln!(out, "{}        .build()", indent);
    let _ = writeln!(out, "{}}}", indent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::LocalEngine;
    use crate::backends::stub::StubBlock;
    use crate::descriptor::ParameterDescriptor;
    use crate::types::TypeTag;

    #[test]
    fn test_snake_case() {
        assert_eq!(snake_case("Pass"), "pass");
        assert_eq!(snake_case("ChainStop"), "chain_stop");
        assert_eq!(snake_case("ToFloat"), "to_float");
        assert_eq!(snake_case("RGBToHex"), "rgb_to_hex");
        assert_eq!(snake_case("Int2Add"), "int2_add");
    }

    #[test]
    fn test_reserved_names_are_escaped() {
        let mut engine = LocalEngine::new();
        engine.register("Type", || {
            Box::new(
                StubBlock::new("Type")
                    .with_parameter(ParameterDescriptor::new("Loop", [TypeTag::Bool]))
                    .with_parameter(ParameterDescriptor::new("Size", [TypeTag::Int])),
            )
        });
        let bindings = Bindings::new(Arc::new(engine));
        let source = StubGenerator::new(&bindings).generate().unwrap();

        assert!(source.contains(
            "pub fn type_(bindings: &Bindings, loop_: Option<HostValue>, size: Option<HostValue>)"
        ));
        assert!(source.contains(".maybe_param(\"Loop\", loop_)"));
    }

    #[test]
    fn test_core_blocks_are_grouped_by_namespace() {
        let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
        let source = StubGenerator::new(&bindings).generate().unwrap();

        assert!(source.contains("pub mod math {"));
        assert!(source.contains("    pub fn add(bindings: &Bindings, operand: Option<HostValue>)"));
        assert!(source.contains("pub fn const_(bindings: &Bindings, value: Option<HostValue>)"));
        assert!(source.contains("pub fn yield_(bindings: &Bindings)"));
        assert!(source.contains("pub fn chain_stop(bindings: &Bindings)"));
        assert!(source.contains(".block(\"Math.Divide\")"));

        // Deterministic: a second pass renders the same text.
        assert_eq!(source, StubGenerator::new(&bindings).generate().unwrap());
    }

    #[test]
    fn test_output_is_sorted() {
        let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
        let source = StubGenerator::new(&bindings).generate().unwrap();
        let chain_stop = source.find("pub fn chain_stop").unwrap();
        let sleep = source.find("pub fn sleep").unwrap();
        assert!(chain_stop < sleep);
    }
}
