// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! JSON persistence for tagged values.
//!
//! Values are written adjacently tagged, e.g. `{"type":"Int2","value":[1,2]}`.
//! Image payloads are base64 encoded. JSON has no NaN or infinity, so values
//! carrying a non-finite float lane are refused rather than written as `null`.

use crate::errors::BindingError;
use crate::types::TaggedValue;

pub fn store(value: &TaggedValue) -> Result<String, BindingError> {
    if let Some(lane) = non_finite_lane(value) {
        return Err(BindingError::MalformedValue {
            reason: format!("{} value has a non-finite lane ({}) that JSON cannot hold", value.tag(), lane),
        });
    }
    serde_json::to_string(value).map_err(|e| BindingError::MalformedValue {
        reason: e.to_string(),
    })
}

pub fn load(json: &str) -> Result<TaggedValue, BindingError> {
    let value: TaggedValue = serde_json::from_str(json).map_err(|e| BindingError::MalformedValue {
        reason: e.to_string(),
    })?;
    value.validate().map_err(|e| BindingError::MalformedValue {
        reason: e.to_string(),
    })?;
    Ok(value)
}

fn non_finite_lane(value: &TaggedValue) -> Option<f64> {
    let lanes: Vec<f64> = match value {
        TaggedValue::Float(v) => vec![*v],
        TaggedValue::Float2(v) => v.to_vec(),
        TaggedValue::Float3(v) => v.iter().map(|l| f64::from(*l)).collect(),
        TaggedValue::Float4(v) => v.iter().map(|l| f64::from(*l)).collect(),
        TaggedValue::Seq(items) => return items.iter().find_map(non_finite_lane),
        TaggedValue::Table(entries) => return entries.values().find_map(non_finite_lane),
        _ => return None,
    };
    lanes.into_iter().find(|l| !l.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_store_format() {
        assert_eq!(
            store(&TaggedValue::int2(1, 2)).unwrap(),
            r#"{"type":"Int2","value":[1,2]}"#
        );
        assert_eq!(store(&TaggedValue::None).unwrap(), r#"{"type":"None"}"#);
    }

    #[test]
    fn test_nested_values_survive_a_round_trip() {
        let mut table = BTreeMap::new();
        table.insert("pos".to_string(), TaggedValue::float3(1.0, 2.0, 3.0));
        table.insert("tint".to_string(), TaggedValue::color(1, 2, 3, 4));
        table.insert(
            "frames".to_string(),
            TaggedValue::Seq(vec![TaggedValue::image(1, 1, 4, vec![9, 8, 7, 6]).unwrap()]),
        );
        let value = TaggedValue::Table(table);

        let json = store(&value).unwrap();
        assert!(json.contains("CQgHBg=="), "image data should be base64: {}", json);
        assert_eq!(load(&json).unwrap(), value);
    }

    #[test]
    fn test_load_rejects_malformed_input() {
        assert!(matches!(
            load(r#"{"type":"Int2","value":[1,2,3]}"#),
            Err(BindingError::MalformedValue { .. })
        ));
        assert!(matches!(load(r#"{"type":"Any"}"#), Err(BindingError::MalformedValue { .. })));

        let short_image = r#"{"type":"Image","value":{"width":2,"height":2,"channels":1,"data":"AAA="}}"#;
        assert!(matches!(load(short_image), Err(BindingError::MalformedValue { .. })));
    }

    #[test]
    fn test_non_finite_floats_are_refused_not_nulled() {
        let values = [
            TaggedValue::Float(f64::NAN),
            TaggedValue::Float(f64::INFINITY),
            TaggedValue::float2(0.0, f64::NEG_INFINITY),
            TaggedValue::float3(f32::NAN, 0.0, 1.0),
            TaggedValue::Seq(vec![TaggedValue::Int(1), TaggedValue::float4(0.0, 0.0, 0.0, f32::INFINITY)]),
        ];
        for value in &values {
            assert!(
                matches!(store(value), Err(BindingError::MalformedValue { .. })),
                "{:?} should not be stored",
                value
            );
        }

        let mut table = BTreeMap::new();
        table.insert("ok".to_string(), TaggedValue::Float(1.5));
        let json = store(&TaggedValue::Table(table.clone())).unwrap();
        assert_eq!(load(&json).unwrap(), TaggedValue::Table(table));
    }

    #[test]
    fn test_null_float_lanes_do_not_load() {
        assert!(matches!(
            load(r#"{"type":"Float","value":null}"#),
            Err(BindingError::MalformedValue { .. })
        ));
    }
}
