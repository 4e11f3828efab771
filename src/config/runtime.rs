// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::bindings::{BindingOptions, Bindings};
use crate::chain::Chain;
use crate::config::loader::{host_value, ChainConfig};
use crate::config::NodeConfig;
use crate::errors::ConfigError;
use crate::node::Node;
use crate::traits::Engine;
use crate::types::tag_of;

/// Node runtime builder - turns a node description into a scheduled node.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use the_chainwright::backends::local::LocalEngine;
/// use the_chainwright::config::{parse_config, RuntimeBuilder};
///
/// let config = parse_config(r#"
/// chains:
///   - name: hello
///     blocks:
///       - block: Msg
///         params: { message: "hello" }
/// "#)?;
///
/// let bindings = RuntimeBuilder::bindings(&config, Arc::new(LocalEngine::with_core_blocks()));
/// let mut node = RuntimeBuilder::from_config(&config, &bindings)?;
/// node.tick()?;
/// assert!(node.all_chains_stopped());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Bindings over `engine` whose validation default follows the description.
    pub fn bindings(cfg: &NodeConfig, engine: Arc<dyn Engine>) -> Bindings {
        Bindings::with_options(
            engine,
            BindingOptions {
                validate_connections: cfg.validate_connections,
            },
        )
    }

    /// Build every chain of the description and schedule it, in order.
    ///
    /// The first invalid block name, parameter, value or connection aborts
    /// the build; no partially scheduled node is returned.
    pub fn from_config(cfg: &NodeConfig, bindings: &Bindings) -> Result<Node, ConfigError> {
        let mut node = Node::new(cfg.node.clone());
        for (index, chain_cfg) in cfg.chains.iter().enumerate() {
            let validate = chain_cfg
                .validate_connections
                .unwrap_or(cfg.validate_connections);
            let chain = Self::build_chain(index, chain_cfg, validate, bindings)?;

            let input = match &chain_cfg.input {
                Some(value) => Some(tag_of(host_value(value, &format!("chains[{}].input", index))?)?),
                None => None,
            };
            node.schedule(chain, input)?;
        }
        Ok(node)
    }

    fn build_chain(
        index: usize,
        chain_cfg: &ChainConfig,
        validate: bool,
        bindings: &Bindings,
    ) -> Result<Chain, ConfigError> {
        let mut handles = Vec::with_capacity(chain_cfg.blocks.len());
        for (position, block_cfg) in chain_cfg.blocks.iter().enumerate() {
            let mut call = bindings.block(block_cfg.block.as_str());
            for (name, value) in &block_cfg.params {
                let path = format!("chains[{}].blocks[{}].params.{}", index, position, name);
                call = call.param(name.as_str(), host_value(value, &path)?);
            }
            handles.push(call.build()?);
        }

        let mut chain = Chain::new(chain_cfg.name.clone())
            .with_validation(validate)
            .looped(chain_cfg.looped)
            .unsafe_(chain_cfg.unsafe_);
        chain.extend(handles)?;
        Ok(chain)
    }
}
