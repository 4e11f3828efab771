// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use crate::backends::local::LocalEngine;
use crate::config::{parse_config, RuntimeBuilder};
use crate::errors::{BindingError, ConfigError};
use crate::node::ChainState;
use crate::types::TaggedValue;

fn build(yaml: &str) -> Result<crate::node::Node, ConfigError> {
    let cfg = parse_config(yaml)?;
    let bindings = RuntimeBuilder::bindings(&cfg, Arc::new(LocalEngine::with_core_blocks()));
    RuntimeBuilder::from_config(&cfg, &bindings)
}

/// A looped counter reads and writes a global every tick.
#[test]
fn test_counter_description_runs() {
    let mut node = build(
        r#"
node: counter-node
chains:
  - name: counter
    looped: true
    blocks:
      - block: GetGlobal
        params: { name: count, default: 0 }
      - block: Math.Add
        params: { operand: 1 }
      - block: SetGlobal
        params: { name: count }
"#,
    )
    .unwrap();

    assert_eq!(node.name(), "counter-node");
    for _ in 0..5 {
        node.tick().unwrap();
    }
    assert_eq!(node.global("count"), Some(&TaggedValue::Int(5)));

    let id = node.find("counter").unwrap();
    assert_eq!(node.iterations(id), Some(5));
    assert_eq!(node.state(id), Some(ChainState::Running));
}

#[test]
fn test_chain_input_and_flags_are_applied() {
    let mut node = build(
        r#"
chains:
  - name: scale
    input: [1, 2]
    blocks:
      - block: Math.Multiply
        params: { operand: [10, 10] }
"#,
    )
    .unwrap();

    node.tick().unwrap();
    let id = node.find("scale").unwrap();
    assert_eq!(node.output(id), Some(&TaggedValue::int2(10, 20)));
    assert_eq!(node.state(id), Some(ChainState::Stopped));
}

#[test]
fn test_incompatible_blocks_are_rejected() {
    let err = build(
        r#"
chains:
  - name: broken
    blocks:
      - block: ToString
      - block: Math.Add
        params: { operand: 1 }
"#,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::Binding(BindingError::IncompatibleConnection { ref producer, ref consumer, .. })
            if producer == "ToString" && consumer == "Math.Add"
    ));
}

#[test]
fn test_validation_can_be_turned_off_per_chain() {
    let node = build(
        r#"
chains:
  - name: loose
    validate_connections: false
    blocks:
      - block: ToString
      - block: Math.Add
        params: { operand: 1 }
"#,
    )
    .unwrap();
    assert_eq!(node.len(), 1);
}

#[test]
fn test_unknown_block_and_parameter() {
    let err = build("chains:\n  - name: c\n    blocks:\n      - block: Teleport\n").unwrap_err();
    assert!(matches!(err, ConfigError::Binding(BindingError::UnknownBlockName { .. })));

    let err = build(
        "chains:\n  - name: c\n    blocks:\n      - block: Msg\n        params: { volume: 11 }\n",
    )
    .unwrap_err();
    assert!(matches!(err, ConfigError::Binding(BindingError::UnknownParameter { .. })));
}

#[test]
fn test_bad_parameter_value_reports_path() {
    let err = build(
        "chains:\n  - name: c\n    blocks:\n      - block: Const\n        params: { value: { color: [1, 2] } }\n",
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::InvalidValue { ref path, .. } if path == "chains[0].blocks[0].params.value.color"
    ));
}

#[tokio::test]
async fn test_run_honours_max_ticks_and_interval() {
    let cfg = parse_config(
        r#"
tick_interval_ms: 1
max_ticks: 3
chains:
  - name: spin
    looped: true
    blocks:
      - block: Pass
"#,
    )
    .unwrap();
    let bindings = RuntimeBuilder::bindings(&cfg, Arc::new(LocalEngine::with_core_blocks()));
    let mut node = RuntimeBuilder::from_config(&cfg, &bindings).unwrap();

    assert_eq!(cfg.tick_interval(), Duration::from_millis(1));
    let ticks = node.run(cfg.tick_interval(), cfg.max_ticks).await.unwrap();
    assert_eq!(ticks, 3);
    assert_eq!(node.iterations(node.find("spin").unwrap()), Some(3));
}
