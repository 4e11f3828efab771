// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine implementations.
//!
//! # Available Backends
//!
//! ## Local Backend
//! An in-process [`Engine`](crate::traits::Engine) that creates blocks from a
//! name → constructor registry. It ships the built-in blocks (constants,
//! logging, flow control, globals, arithmetic and casting) and accepts custom
//! registrations.
//!
//! ## Stub Backend (Test-Only)
//! - **StubBlock**: pass-through block with configurable types and parameters
//! - **FailingBlock**: always fails, for error propagation tests
//! - **Note**: NOT available in production builds
//!
//! # Examples
//!
//! ```rust
//! use the_chainwright::backends::local::LocalEngine;
//! use the_chainwright::traits::Engine;
//!
//! let engine = LocalEngine::with_core_blocks();
//! let block = engine.create_block("Math.Add").expect("built-in block");
//! assert_eq!(block.name(), "Math.Add");
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
