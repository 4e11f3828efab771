// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use super::blocks::casting::{ToFloatBlock, ToStringBlock};
use super::blocks::common::{ConstBlock, LogBlock, MsgBlock, PassBlock};
use super::blocks::flow::{
    ChainRestartBlock, ChainStopBlock, NodeStopBlock, SleepBlock, WaitChainBlock, WaitGlobalBlock,
    YieldBlock,
};
use super::blocks::math::{MathBlock, MathOp};
use super::blocks::variables::{GetGlobalBlock, SetGlobalBlock};
use crate::traits::{Block, Engine};

/// Creates a fresh block instance
pub type BlockConstructor = Arc<dyn Fn() -> Box<dyn Block> + Send + Sync>;

/// In-process engine: a registry from block name to constructor.
///
/// Built-in blocks:
/// - "Const", "Pass", "Log", "Msg"
/// - "Sleep", "Yield", "WaitGlobal", "WaitChain", "ChainStop", "ChainRestart", "NodeStop"
/// - "SetGlobal", "GetGlobal"
/// - "Math.Add", "Math.Subtract", "Math.Multiply", "Math.Divide"
/// - "ToString", "ToFloat"
#[derive(Default, Clone)]
pub struct LocalEngine {
    constructors: BTreeMap<String, BlockConstructor>,
}

impl LocalEngine {
    /// An engine with no blocks registered
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core_blocks() -> Self {
        let mut engine = Self::new();

        engine.register("Const", || Box::new(ConstBlock::new()));
        engine.register("Pass", || Box::new(PassBlock));
        engine.register("Log", || Box::new(LogBlock::new()));
        engine.register("Msg", || Box::new(MsgBlock::new()));

        engine.register("Sleep", || Box::new(SleepBlock::new()));
        engine.register("Yield", || Box::new(YieldBlock));
        engine.register("WaitGlobal", || Box::new(WaitGlobalBlock::new()));
        engine.register("WaitChain", || Box::new(WaitChainBlock::new()));
        engine.register("ChainStop", || Box::new(ChainStopBlock));
        engine.register("ChainRestart", || Box::new(ChainRestartBlock));
        engine.register("NodeStop", || Box::new(NodeStopBlock));

        engine.register("SetGlobal", || Box::new(SetGlobalBlock::new()));
        engine.register("GetGlobal", || Box::new(GetGlobalBlock::new()));

        for op in MathOp::ALL {
            engine.register(op.block_name(), move || Box::new(MathBlock::new(op)));
        }

        engine.register("ToString", || Box::new(ToStringBlock));
        engine.register("ToFloat", || Box::new(ToFloatBlock));

        engine
    }

    /// Register or replace the constructor for `name`.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn() -> Box<dyn Block> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Arc::new(constructor));
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }
}

impl Engine for LocalEngine {
    fn create_block(&self, name: &str) -> Option<Box<dyn Block>> {
        self.constructors.get(name).map(|constructor| constructor())
    }

    fn block_names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::StubBlock;

    #[test]
    fn test_core_blocks_report_their_registered_names() {
        let engine = LocalEngine::with_core_blocks();
        for name in engine.block_names() {
            let block = engine.create_block(&name).unwrap();
            assert_eq!(block.name(), name);
        }
        assert!(engine.is_registered("Math.Divide"));
    }

    #[test]
    fn test_unknown_name_creates_nothing() {
        assert!(LocalEngine::with_core_blocks().create_block("Nope").is_none());
    }

    #[test]
    fn test_register_custom_block() {
        let mut engine = LocalEngine::new();
        engine.register("Custom.Thing", || Box::new(StubBlock::new("Custom.Thing")));
        assert_eq!(engine.block_names(), vec!["Custom.Thing".to_string()]);
        assert!(engine.create_block("Custom.Thing").is_some());
    }
}
