// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_NODE_NAME, DEFAULT_TICK_INTERVAL_MS};
use crate::errors::{BindingError, ConfigError};
use crate::types::{HostValue, TaggedValue};
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A node description: its chains and how to run them.
///
/// # Fields
/// * `node` - Name of the node (defaults to `main`)
/// * `validate_connections` - Default connection checking for every chain (defaults to true)
/// * `tick_interval_ms` - Pause between ticks when running (defaults to 16)
/// * `max_ticks` - Stop running after this many ticks (optional)
/// * `chains` - Chains to schedule, in schedule order
///
/// # Example
/// ```yaml
/// node: main
/// tick_interval_ms: 16
/// chains:
///   - name: counter
///     looped: true
///     input: 0
///     blocks:
///       - block: Math.Add
///         params: { operand: 1 }
///       - block: Log
/// ```
#[derive(Debug, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "default_node_name")]
    pub node: String,
    #[serde(default = "default_validate")]
    pub validate_connections: bool,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub max_ticks: Option<u64>,
    #[serde(default)]
    pub chains: Vec<ChainConfig>,
}

impl NodeConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// One chain of a node description.
///
/// # Fields
/// * `name` - Chain name, unique within the node
/// * `looped` - Rerun the chain every tick (defaults to false)
/// * `unsafe` - Write globals straight through (defaults to false)
/// * `validate_connections` - Override of the node-wide setting (optional)
/// * `input` - Initial input in host-value syntax (optional)
/// * `blocks` - Blocks in dataflow order; at least one is required
#[derive(Debug, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    #[serde(default)]
    pub looped: bool,
    #[serde(default, rename = "unsafe")]
    pub unsafe_: bool,
    #[serde(default)]
    pub validate_connections: Option<bool>,
    #[serde(default)]
    pub input: Option<Value>,
    #[serde(default)]
    pub blocks: Vec<BlockConfig>,
}

/// One block of a chain: its engine name and named parameters.
#[derive(Debug, Deserialize)]
pub struct BlockConfig {
    pub block: String,
    #[serde(default)]
    pub params: BTreeMap<String, Value>,
}

fn default_node_name() -> String {
    DEFAULT_NODE_NAME.to_string()
}

fn default_validate() -> bool {
    true
}

fn default_tick_interval() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

/// Load a node description from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NodeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and check a node description
pub fn parse_config(text: &str) -> Result<NodeConfig, ConfigError> {
    let cfg: NodeConfig = serde_yaml::from_str(text)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

fn validate_config(cfg: &NodeConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, chain) in cfg.chains.iter().enumerate() {
        if chain.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                path: format!("chains[{}].name", index),
                reason: "chain name must not be empty".to_string(),
            });
        }
        if !seen.insert(chain.name.as_str()) {
            return Err(ConfigError::InvalidValue {
                path: format!("chains[{}].name", index),
                reason: format!("duplicate chain name '{}'", chain.name),
            });
        }
        if chain.blocks.is_empty() {
            return Err(BindingError::MissingRequiredStructure {
                chain: chain.name.clone(),
            }
            .into());
        }
    }
    Ok(())
}

/// Convert YAML into a host value.
///
/// * scalars map to scalars
/// * a non-empty list of numbers is a tuple, any other list is a sequence
/// * `{color: [r, g, b, a]}`, `{chain: name}`, `{var: name}`, `{seq: [..]}` and
///   `{tuple: [..]}` are explicit forms; any other mapping is a table
pub fn host_value(value: &Value, path: &str) -> Result<HostValue, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        path: path.to_string(),
        reason,
    };

    match value {
        Value::Null => Ok(HostValue::None),
        Value::Bool(b) => Ok(HostValue::Bool(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(HostValue::Int(i))
            } else if n.is_u64() {
                Err(invalid(format!("integer {} does not fit in 64 bits", n)))
            } else {
                n.as_f64()
                    .map(HostValue::Float)
                    .ok_or_else(|| invalid(format!("unsupported number {}", n)))
            }
        }
        Value::String(s) => Ok(HostValue::Text(s.clone())),
        Value::Sequence(items) => {
            let converted = elements(items, path)?;
            if !items.is_empty() && items.iter().all(Value::is_number) {
                Ok(HostValue::Tuple(converted))
            } else {
                Ok(HostValue::Sequence(converted))
            }
        }
        Value::Mapping(mapping) => {
            if mapping.len() == 1 {
                if let Some((Value::String(key), inner)) = mapping.iter().next() {
                    if let Some(explicit) = explicit_form(key, inner, path)? {
                        return Ok(explicit);
                    }
                }
            }

            let mut table = BTreeMap::new();
            for (key, inner) in mapping {
                let key = key
                    .as_str()
                    .ok_or_else(|| invalid("table keys must be strings".to_string()))?;
                table.insert(key.to_string(), host_value(inner, &format!("{}.{}", path, key))?);
            }
            Ok(HostValue::Map(table))
        }
        Value::Tagged(tagged) => Err(invalid(format!("unsupported YAML tag {}", tagged.tag))),
    }
}

fn elements(items: &[Value], path: &str) -> Result<Vec<HostValue>, ConfigError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| host_value(item, &format!("{}[{}]", path, i)))
        .collect()
}

fn explicit_form(key: &str, inner: &Value, path: &str) -> Result<Option<HostValue>, ConfigError> {
    let nested = format!("{}.{}", path, key);
    let invalid = |reason: &str| ConfigError::InvalidValue {
        path: nested.clone(),
        reason: reason.to_string(),
    };

    let value = match key {
        "color" => {
            let lanes = inner
                .as_sequence()
                .filter(|lanes| lanes.len() == 4)
                .ok_or_else(|| invalid("expected [r, g, b, a]"))?;
            let mut rgba = [0i64; 4];
            for (slot, lane) in rgba.iter_mut().zip(lanes) {
                *slot = lane.as_i64().ok_or_else(|| invalid("color lanes must be integers"))?;
            }
            HostValue::Color(rgba)
        }
        "chain" => {
            let name = inner.as_str().ok_or_else(|| invalid("expected a chain name"))?;
            HostValue::ChainHandle(name.to_string())
        }
        "var" => {
            let name = inner.as_str().ok_or_else(|| invalid("expected a variable name"))?;
            HostValue::Tagged(TaggedValue::context_var(name))
        }
        "seq" => {
            let items = inner.as_sequence().ok_or_else(|| invalid("expected a list"))?;
            HostValue::Sequence(elements(items, &nested)?)
        }
        "tuple" => {
            let items = inner.as_sequence().ok_or_else(|| invalid("expected a list"))?;
            HostValue::Tuple(elements(items, &nested)?)
        }
        _ => return Ok(None),
    };
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::tag_of;
    use std::io::Write;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn tagged(text: &str) -> TaggedValue {
        tag_of(host_value(&yaml(text), "value").unwrap()).unwrap()
    }

    #[test]
    fn test_parse_with_defaults() {
        let cfg = parse_config(
            r#"
chains:
  - name: hello
    blocks:
      - block: Msg
        params: { message: hi }
"#,
        )
        .unwrap();

        assert_eq!(cfg.node, "main");
        assert!(cfg.validate_connections);
        assert_eq!(cfg.tick_interval(), Duration::from_millis(16));
        assert_eq!(cfg.max_ticks, None);
        assert_eq!(cfg.chains.len(), 1);
        assert!(!cfg.chains[0].looped);
        assert!(!cfg.chains[0].unsafe_);
        assert_eq!(cfg.chains[0].blocks[0].block, "Msg");
    }

    #[test]
    fn test_parse_full_description() {
        let cfg = parse_config(
            r#"
node: worker
validate_connections: false
tick_interval_ms: 5
max_ticks: 10
chains:
  - name: counter
    looped: true
    unsafe: true
    validate_connections: true
    input: 0
    blocks:
      - block: Math.Add
        params: { operand: 1 }
"#,
        )
        .unwrap();

        assert_eq!(cfg.node, "worker");
        assert!(!cfg.validate_connections);
        assert_eq!(cfg.max_ticks, Some(10));
        let chain = &cfg.chains[0];
        assert!(chain.looped && chain.unsafe_);
        assert_eq!(chain.validate_connections, Some(true));
        assert_eq!(chain.input, Some(yaml("0")));
    }

    #[test]
    fn test_rejects_empty_chain() {
        let err = parse_config("chains:\n  - name: nothing\n    blocks: []\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Binding(BindingError::MissingRequiredStructure { ref chain }) if chain == "nothing"
        ));
    }

    #[test]
    fn test_rejects_duplicate_chain_names() {
        let err = parse_config(
            r#"
chains:
  - name: a
    blocks: [{ block: Pass }]
  - name: a
    blocks: [{ block: Pass }]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref path, .. } if path == "chains[1].name"));
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        assert!(matches!(parse_config("chains: [").unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_host_value_syntax() {
        assert_eq!(tagged("~"), TaggedValue::None);
        assert_eq!(tagged("true"), TaggedValue::Bool(true));
        assert_eq!(tagged("7"), TaggedValue::Int(7));
        assert_eq!(tagged("1.5"), TaggedValue::Float(1.5));
        assert_eq!(tagged("hello"), TaggedValue::string("hello"));
        assert_eq!(tagged("[1, 2]"), TaggedValue::int2(1, 2));
        assert_eq!(tagged("[1, 2.5, 3]"), TaggedValue::float3(1.0, 2.5, 3.0));
        assert_eq!(tagged("{color: [255, 0, 0, 255]}"), TaggedValue::color(255, 0, 0, 255));
        assert_eq!(tagged("{chain: worker}"), TaggedValue::chain("worker"));
        assert_eq!(tagged("{var: x}"), TaggedValue::context_var("x"));
        assert_eq!(
            tagged("{seq: [1, 2]}"),
            TaggedValue::Seq(vec![TaggedValue::Int(1), TaggedValue::Int(2)])
        );
        assert_eq!(
            tagged("[a, 1]"),
            TaggedValue::Seq(vec![TaggedValue::string("a"), TaggedValue::Int(1)])
        );
        assert_eq!(tagged("{tuple: [3]}"), TaggedValue::Int(3));

        let table = tagged("{a: 1, b: [x]}");
        let TaggedValue::Table(entries) = table else {
            panic!("expected a table");
        };
        assert_eq!(entries["a"], TaggedValue::Int(1));
        assert_eq!(entries["b"], TaggedValue::Seq(vec![TaggedValue::string("x")]));
    }

    #[test]
    fn test_invalid_color_reports_path() {
        let err = host_value(&yaml("{color: [1, 2, 3]}"), "chains[0].input").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref path, .. } if path == "chains[0].input.color"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "node: from-file\nchains:\n  - name: c\n    blocks:\n      - block: Pass"
        )
        .unwrap();

        let cfg = load_config(file.path()).unwrap();
        assert_eq!(cfg.node, "from-file");
        assert_eq!(cfg.chains[0].name, "c");
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
