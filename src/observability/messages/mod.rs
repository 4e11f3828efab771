// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `binding` - block creation and parameter events
//! * `chain` - chain assembly events
//! * `node` - scheduler lifecycle and execution events
//!
//! Each message knows its own log level. Call [`StructuredLog::log`] to emit it
//! with structured fields, or [`StructuredLog::span`] to open a span carrying
//! the same fields.

use tracing::Span;

pub mod binding;
pub mod chain;
pub mod node;

/// A log message that emits itself at its own level with structured fields.
pub trait StructuredLog: std::fmt::Display {
    fn log(&self);

    fn span(&self, name: &str) -> Span;
}
