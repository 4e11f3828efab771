// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic and operational event emitted by the crate is a message
//! struct with a `Display` implementation, so that log text lives in one place
//! instead of being scattered through the code as format strings.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::binding` - block creation and parameter assignment
//! * `messages::chain` - chain assembly and the current-chain scope
//! * `messages::node` - scheduling, ticking, suspension and stopping
//!
//! # Usage
//!
//! ```rust
//! use the_chainwright::observability::messages::{node::ChainScheduled, StructuredLog};
//!
//! let msg = ChainScheduled {
//!     node: "main",
//!     chain: "counter",
//!     looped: true,
//!     unsafe_: false,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
