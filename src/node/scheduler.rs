// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cooperative tick scheduler.
//!
//! A [`Node`] owns its chains and advances each of them by one cooperative
//! step per [`Node::tick`], in the order they were scheduled. A step runs
//! blocks until the chain completes, suspends, stops or restarts. Suspended
//! chains keep a [`Continuation`] and pick up from the block after the one
//! that suspended, never from the start.
//!
//! # Execution Flow
//!
//! ```text
//! Scheduled ──tick──▶ Running ──suspend──▶ Suspended
//!                        ▲ │                   │
//!                        │ └──complete/stop──▶ Stopped
//!                        └───condition met─────┘
//! ```
//!
//! Global writes made by safe chains are staged per chain and committed in
//! schedule order when the tick ends. Unsafe chains write through at once.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::chain::Chain;
use crate::errors::{BindingError, BlockError, ChainFailure, EngineError};
use crate::node::{
    ActivationContext, ChainState, Clock, Continuation, ResumeCondition, StopHandle, SystemClock,
};
use crate::observability::messages::{node::*, StructuredLog};
use crate::traits::{Flow, SuspendOn};
use crate::types::TaggedValue;

/// Handle to a chain scheduled in a node. Stays valid after the chain stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(u64);

impl ChainId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub tick: u64,
    /// Chains that activated blocks during this tick
    pub ran: usize,
    pub suspended: usize,
    pub stopped: usize,
}

struct ScheduledChain {
    id: ChainId,
    name: String,
    chain: Chain,
    input: TaggedValue,
    looped: bool,
    unsafe_: bool,
    state: ChainState,
    continuation: Option<Continuation>,
    output: Option<TaggedValue>,
    iterations: u64,
    staged: HashMap<String, TaggedValue>,
}

/// How a chain's step ended.
enum StepEnd {
    Completed(TaggedValue),
    Suspended {
        block: String,
        resume_at: usize,
        output: TaggedValue,
        on: SuspendOn,
    },
    Stopped(TaggedValue),
    Restarted,
    Failed { block: String, error: BlockError },
    /// A node stop was requested between two activations
    Interrupted(Continuation),
}

pub struct Node {
    name: String,
    chains: Vec<ScheduledChain>,
    globals: HashMap<String, TaggedValue>,
    clock: Arc<dyn Clock>,
    stop: StopHandle,
    stopped: bool,
    ticks: u64,
    next_id: u64,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            chains: Vec::new(),
            globals: HashMap::new(),
            clock: Arc::new(SystemClock),
            stop: StopHandle::new(),
            stopped: false,
            ticks: 0,
            next_id: 1,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schedule a chain with its own `looped`/`unsafe` flags.
    ///
    /// Names are unique per node, stopped chains included, since waits
    /// resolve their target by name.
    pub fn schedule(&mut self, chain: Chain, input: Option<TaggedValue>) -> Result<ChainId, BindingError> {
        if self.stopped {
            return Err(BindingError::NodeStopped);
        }
        if chain.is_empty() {
            return Err(BindingError::MissingRequiredStructure {
                chain: chain.name().to_string(),
            });
        }
        if self.find(chain.name()).is_some() {
            return Err(BindingError::DuplicateChainName {
                chain: chain.name().to_string(),
            });
        }

        let id = ChainId(self.next_id);
        self.next_id += 1;

        let entry = ScheduledChain {
            id,
            name: chain.name().to_string(),
            looped: chain.is_looped(),
            unsafe_: chain.is_unsafe(),
            chain,
            input: input.unwrap_or_default(),
            state: ChainState::Scheduled,
            continuation: None,
            output: None,
            iterations: 0,
            staged: HashMap::new(),
        };

        ChainScheduled {
            node: &self.name,
            chain: &entry.name,
            looped: entry.looped,
            unsafe_: entry.unsafe_,
        }
        .log();

        self.chains.push(entry);
        Ok(id)
    }

    /// Schedule a chain, overriding its flags.
    pub fn schedule_with_flags(
        &mut self,
        mut chain: Chain,
        input: Option<TaggedValue>,
        looped: bool,
        unsafe_: bool,
    ) -> Result<ChainId, BindingError> {
        chain.set_looped(looped);
        chain.set_unsafe(unsafe_);
        self.schedule(chain, input)
    }

    /// Advance every live chain by one cooperative step.
    ///
    /// Block failures stop the failing chain only; the rest of the tick still
    /// runs and every failure is reported in the returned error.
    pub fn tick(&mut self) -> Result<TickSummary, EngineError> {
        if self.stopped {
            return Ok(self.summary(0));
        }
        if self.stop.is_requested() {
            self.halt();
            return Ok(self.summary(0));
        }

        self.ticks += 1;
        let now = self.clock.now();
        let mut ran = 0;
        let mut failures = Vec::new();

        for index in 0..self.chains.len() {
            if !self.ready(index, now) {
                continue;
            }
            ran += 1;

            let end = self.run_blocks(index, now);
            if let Some(failure) = self.settle(index, end, now) {
                failures.push(failure);
            }

            if self.stop.is_requested() {
                break;
            }
        }

        self.commit_staged();
        if self.stop.is_requested() {
            NodeStopRequested { node: &self.name }.log();
            self.halt();
        }

        let summary = self.summary(ran);
        TickCompleted {
            node: &self.name,
            summary: &summary,
        }
        .log();

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(EngineError::ChainsFailed {
                tick: self.ticks,
                failures,
            })
        }
    }

    /// Move a chain to `Running` if it may take a step this tick.
    fn ready(&mut self, index: usize, now: Instant) -> bool {
        match self.chains[index].state {
            ChainState::Stopped => false,
            ChainState::Running => true,
            ChainState::Scheduled => {
                let entry = &mut self.chains[index];
                entry.state = ChainState::Running;
                entry.continuation = Some(Continuation::start(entry.input.clone()));
                true
            }
            ChainState::Suspended => {
                let satisfied = match self.chains[index]
                    .continuation
                    .as_ref()
                    .and_then(|c| c.pending.as_ref())
                {
                    Some(condition) => self.condition_met(condition, now),
                    None => true,
                };
                if !satisfied {
                    return false;
                }

                let entry = &mut self.chains[index];
                entry.state = ChainState::Running;
                if let Some(continuation) = entry.continuation.as_mut() {
                    continuation.pending = None;
                    ChainResumed {
                        chain: &entry.name,
                        resume_at: continuation.resume_at,
                    }
                    .log();
                }
                true
            }
        }
    }

    fn condition_met(&self, condition: &ResumeCondition, now: Instant) -> bool {
        match condition {
            ResumeCondition::Elapsed { deadline, .. } => now >= *deadline,
            ResumeCondition::Global { name } => self.globals.contains_key(name),
            ResumeCondition::ChainDone { name } => self
                .chains
                .iter()
                .any(|c| c.name == *name && c.state == ChainState::Stopped),
            ResumeCondition::NextTick => true,
        }
    }

    /// Activate blocks from the chain's continuation until the step ends.
    fn run_blocks(&mut self, index: usize, now: Instant) -> StepEnd {
        let stop = &self.stop;
        let globals = &mut self.globals;
        let entry = &mut self.chains[index];

        let Continuation {
            mut resume_at,
            mut carried,
            ..
        } = entry
            .continuation
            .take()
            .unwrap_or_else(|| Continuation::start(entry.input.clone()));

        let start_msg = ChainStepStarted {
            node: &self.name,
            chain: &entry.name,
            resume_at,
        };
        let span = start_msg.span("chain_step");
        let _guard = span.enter();
        start_msg.log();

        while resume_at < entry.chain.len() {
            if stop.is_requested() {
                return StepEnd::Interrupted(Continuation {
                    resume_at,
                    carried,
                    pending: None,
                });
            }

            let Some(block) = entry.chain.block_mut(resume_at) else {
                break;
            };
            let mut ctx = ActivationContext::new(
                &entry.name,
                now,
                entry.unsafe_,
                globals,
                &mut entry.staged,
                stop,
            );

            let flow = block.activate(&mut ctx, carried);
            let block_name = block.name().to_string();

            match flow {
                Ok(Flow::Continue(value)) => {
                    carried = value;
                    resume_at += 1;
                }
                Ok(Flow::Suspend { on, output }) => {
                    return StepEnd::Suspended {
                        block: block_name,
                        resume_at: resume_at + 1,
                        output,
                        on,
                    };
                }
                Ok(Flow::Stop(value)) => return StepEnd::Stopped(value),
                Ok(Flow::Restart) => return StepEnd::Restarted,
                Err(error) => {
                    return StepEnd::Failed {
                        block: block_name,
                        error,
                    }
                }
            }
        }

        StepEnd::Completed(carried)
    }

    /// Apply the end of a step to the chain's state.
    fn settle(&mut self, index: usize, end: StepEnd, now: Instant) -> Option<ChainFailure> {
        match end {
            StepEnd::Completed(output) => {
                let entry = &mut self.chains[index];
                entry.output = Some(output);
                entry.iterations += 1;
                ChainCompleted {
                    chain: &entry.name,
                    iterations: entry.iterations,
                    looped: entry.looped,
                }
                .log();

                if entry.looped {
                    entry.continuation = Some(Continuation::start(entry.input.clone()));
                } else {
                    self.stop_entry(index, "completed");
                }
                None
            }
            StepEnd::Suspended {
                block,
                resume_at,
                output,
                on,
            } => {
                let condition = match on {
                    SuspendOn::Sleep(duration) => ResumeCondition::Elapsed {
                        deadline: now + duration,
                        duration,
                    },
                    SuspendOn::Global(name) => ResumeCondition::Global { name },
                    SuspendOn::Chain(name) => {
                        if !self.chains.iter().any(|c| c.name == name) {
                            let error = BlockError::Failed(format!(
                                "chain '{}' is not scheduled in node '{}'",
                                name, self.name
                            ));
                            return Some(self.fail(index, block, error));
                        }
                        ResumeCondition::ChainDone { name }
                    }
                    SuspendOn::Yield => ResumeCondition::NextTick,
                };

                let entry = &mut self.chains[index];
                ChainSuspended {
                    chain: &entry.name,
                    block: &block,
                    condition: &condition,
                }
                .log();
                entry.state = ChainState::Suspended;
                entry.continuation = Some(Continuation::suspended(resume_at, output, condition));
                None
            }
            StepEnd::Stopped(output) => {
                self.chains[index].output = Some(output);
                self.stop_entry(index, "stopped by block");
                None
            }
            StepEnd::Restarted => {
                let entry = &mut self.chains[index];
                entry.continuation = Some(Continuation::start(entry.input.clone()));
                None
            }
            StepEnd::Failed { block, error } => Some(self.fail(index, block, error)),
            StepEnd::Interrupted(continuation) => {
                self.chains[index].continuation = Some(continuation);
                None
            }
        }
    }

    fn fail(&mut self, index: usize, block: String, error: BlockError) -> ChainFailure {
        let chain = self.chains[index].name.clone();
        ChainFailed {
            node: &self.name,
            chain: &chain,
            block: &block,
            error: &error,
        }
        .log();
        self.stop_entry(index, "block failed");
        ChainFailure {
            chain,
            block,
            error,
        }
    }

    fn commit_staged(&mut self) {
        for entry in &mut self.chains {
            self.globals.extend(entry.staged.drain());
        }
    }

    fn stop_entry(&mut self, index: usize, reason: &str) {
        let entry = &mut self.chains[index];
        if entry.state == ChainState::Stopped {
            return;
        }
        entry.state = ChainState::Stopped;
        entry.continuation = None;
        entry.chain.release();
        ChainStopped {
            node: &self.name,
            chain: &entry.name,
            reason,
        }
        .log();
    }

    fn halt(&mut self) {
        for index in 0..self.chains.len() {
            self.stop_entry(index, "node stopped");
        }
        self.stopped = true;
        NodeStopped {
            node: &self.name,
            chains: self.chains.len(),
            ticks: self.ticks,
        }
        .log();
    }

    fn summary(&self, ran: usize) -> TickSummary {
        TickSummary {
            tick: self.ticks,
            ran,
            suspended: self.count(ChainState::Suspended),
            stopped: self.count(ChainState::Stopped),
        }
    }

    fn count(&self, state: ChainState) -> usize {
        self.chains.iter().filter(|c| c.state == state).count()
    }

    /// Stop every chain, cleaning up their blocks. The node cannot be restarted.
    pub fn stop(&mut self) {
        if !self.stopped {
            self.halt();
        }
    }

    pub fn stop_chain(&mut self, id: ChainId) -> Result<(), BindingError> {
        let index = self.index_of(id)?;
        self.stop_entry(index, "stopped by caller");
        Ok(())
    }

    /// Rewind a live chain so that it starts over on the next tick.
    pub fn reschedule(&mut self, id: ChainId) -> Result<(), BindingError> {
        if self.stopped {
            return Err(BindingError::NodeStopped);
        }
        let entry = self.live_entry(id)?;
        entry.state = ChainState::Scheduled;
        entry.continuation = None;
        Ok(())
    }

    /// Replace the input used by the chain's next iteration.
    pub fn set_input(&mut self, id: ChainId, value: TaggedValue) -> Result<(), BindingError> {
        self.live_entry(id)?.input = value;
        Ok(())
    }

    fn index_of(&self, id: ChainId) -> Result<usize, BindingError> {
        self.chains
            .iter()
            .position(|c| c.id == id)
            .ok_or(BindingError::UnknownChain { id: id.value() })
    }

    fn live_entry(&mut self, id: ChainId) -> Result<&mut ScheduledChain, BindingError> {
        let index = self.index_of(id)?;
        let entry = &mut self.chains[index];
        if entry.state == ChainState::Stopped {
            return Err(BindingError::ChainStopped {
                chain: entry.name.clone(),
            });
        }
        Ok(entry)
    }

    fn entry(&self, id: ChainId) -> Option<&ScheduledChain> {
        self.chains.iter().find(|c| c.id == id)
    }

    pub fn state(&self, id: ChainId) -> Option<ChainState> {
        self.entry(id).map(|c| c.state)
    }

    /// Output of the chain's last completed iteration or stop
    pub fn output(&self, id: ChainId) -> Option<&TaggedValue> {
        self.entry(id).and_then(|c| c.output.as_ref())
    }

    pub fn iterations(&self, id: ChainId) -> Option<u64> {
        self.entry(id).map(|c| c.iterations)
    }

    pub fn continuation(&self, id: ChainId) -> Option<&Continuation> {
        self.entry(id).and_then(|c| c.continuation.as_ref())
    }

    pub fn chain_name(&self, id: ChainId) -> Option<&str> {
        self.entry(id).map(|c| c.name.as_str())
    }

    /// Chain scheduled under `name`
    pub fn find(&self, name: &str) -> Option<ChainId> {
        self.chains.iter().find(|c| c.name == name).map(|c| c.id)
    }

    pub fn chain_ids(&self) -> Vec<ChainId> {
        self.chains.iter().map(|c| c.id).collect()
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn global(&self, name: &str) -> Option<&TaggedValue> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: TaggedValue) {
        self.globals.insert(name.into(), value);
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn all_chains_stopped(&self) -> bool {
        self.chains.iter().all(|c| c.state == ChainState::Stopped)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Tick until every chain has stopped, a stop is requested or `max_ticks`
    /// ticks have run, sleeping `interval` between ticks. A stop request cuts
    /// the sleep short. Returns the number of ticks that activated the node.
    pub async fn run(&mut self, interval: Duration, max_ticks: Option<u64>) -> Result<u64, EngineError> {
        let mut ran = 0u64;
        let reason = loop {
            if self.stopped {
                break "node stopped";
            }
            if self.stop.is_requested() {
                NodeStopRequested { node: &self.name }.log();
                self.halt();
                break "stop requested";
            }
            if self.all_chains_stopped() {
                break "all chains stopped";
            }
            if max_ticks.is_some_and(|max| ran >= max) {
                break "tick limit reached";
            }

            if ran > 0 {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {}
                    _ = self.stop.requested() => {}
                }
                if self.stop.is_requested() {
                    continue;
                }
            }
            self.tick()?;
            ran += 1;
        };

        RunFinished {
            node: &self.name,
            ticks: ran,
            reason,
        }
        .log();
        Ok(ran)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("chains", &self.chains.len())
            .field("ticks", &self.ticks)
            .field("stopped", &self.stopped)
            .finish()
    }
}
