// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dataflow compatibility between a producer's outputs and a consumer's inputs.

use crate::types::{TypeSet, TypeTag};

/// Decide whether `outputs` may feed `inputs`.
///
/// One satisfied input tag is enough; the remaining input tags are not checked.
/// `Any` on either side satisfies everything. There is no coercion, so `Int`
/// does not satisfy `Int2`.
pub fn compatible(outputs: &TypeSet, inputs: &TypeSet) -> bool {
    for input in inputs.iter() {
        if input == TypeTag::Any {
            return true;
        }
        for output in outputs.iter() {
            if output == TypeTag::Any || output == input {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[TypeTag]) -> TypeSet {
        TypeSet::of(tags.iter().copied())
    }

    #[test]
    fn test_wildcards_on_either_side() {
        let concrete = [
            set(&[TypeTag::Int]),
            set(&[TypeTag::String, TypeTag::Float4]),
            set(&[TypeTag::Image]),
            set(&[TypeTag::None]),
        ];

        for other in &concrete {
            assert!(compatible(other, &set(&[TypeTag::Any])));
            assert!(compatible(&set(&[TypeTag::Any]), other));
            assert!(compatible(other, &set(&[TypeTag::Bool, TypeTag::Any])));
            assert!(compatible(&set(&[TypeTag::Bool, TypeTag::Any]), other));
        }
    }

    #[test]
    fn test_no_coercion_between_arities() {
        assert!(!compatible(&set(&[TypeTag::Int]), &set(&[TypeTag::Int2])));
        assert!(compatible(&set(&[TypeTag::Int2]), &set(&[TypeTag::Int2])));
        assert!(!compatible(&set(&[TypeTag::Float3]), &set(&[TypeTag::Int3])));
        assert!(!compatible(&set(&[TypeTag::Int4]), &set(&[TypeTag::Color])));
    }

    #[test]
    fn test_one_matching_input_is_enough() {
        let outputs = set(&[TypeTag::Float]);
        let inputs = set(&[TypeTag::String, TypeTag::Float, TypeTag::Image]);
        assert!(compatible(&outputs, &inputs));
    }

    #[test]
    fn test_empty_sets_are_incompatible() {
        assert!(!compatible(&set(&[TypeTag::Int]), &TypeSet::new()));
        assert!(!compatible(&TypeSet::new(), &set(&[TypeTag::Int])));
    }
}
