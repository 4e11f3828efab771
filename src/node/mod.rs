// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod clock;
mod context;
mod continuation;
mod scheduler;


pub use clock::{Clock, ManualClock, SystemClock};
pub use context::{ActivationContext, StopHandle};
pub use continuation::{ChainState, Continuation, ResumeCondition};
pub use scheduler::{ChainId, Node, TickSummary};
