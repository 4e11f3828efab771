// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::{Duration, Instant};

use crate::types::TaggedValue;

/// Lifecycle of a chain inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Scheduled,
    Running,
    Suspended,
    Stopped,
}

impl fmt::Display for ChainState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChainState::Scheduled => "scheduled",
            ChainState::Running => "running",
            ChainState::Suspended => "suspended",
            ChainState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Condition a suspended chain waits on.
#[derive(Debug, Clone, PartialEq)]
pub enum ResumeCondition {
    /// `deadline` is measured on the node's clock; `duration` is the requested sleep.
    Elapsed { deadline: Instant, duration: Duration },
    Global { name: String },
    ChainDone { name: String },
    NextTick,
}

impl fmt::Display for ResumeCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResumeCondition::Elapsed { duration, .. } => write!(f, "{:?} elapsed", duration),
            ResumeCondition::Global { name } => write!(f, "global '{}' is set", name),
            ResumeCondition::ChainDone { name } => write!(f, "chain '{}' stops", name),
            ResumeCondition::NextTick => f.write_str("next tick"),
        }
    }
}

/// Where a chain picks up on its next step.
#[derive(Debug, Clone, PartialEq)]
pub struct Continuation {
    /// Index of the next block to activate
    pub resume_at: usize,
    /// Value fed into that block
    pub carried: TaggedValue,
    pub pending: Option<ResumeCondition>,
}

impl Continuation {
    /// Start of a fresh iteration
    pub fn start(input: TaggedValue) -> Self {
        Self {
            resume_at: 0,
            carried: input,
            pending: None,
        }
    }

    pub fn suspended(resume_at: usize, carried: TaggedValue, pending: ResumeCondition) -> Self {
        Self {
            resume_at,
            carried,
            pending: Some(pending),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_displays_the_requested_sleep() {
        let condition = ResumeCondition::Elapsed {
            deadline: Instant::now() + Duration::from_secs(3600),
            duration: Duration::from_millis(250),
        };
        assert_eq!(condition.to_string(), "250ms elapsed");
        assert_eq!(ResumeCondition::NextTick.to_string(), "next tick");
    }
}
