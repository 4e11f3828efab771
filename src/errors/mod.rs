// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod binding;
mod config;
mod engine;

pub use binding::BindingError;
pub use config::ConfigError;
pub use engine::{BlockError, ChainFailure, EngineError};
