// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::errors::BindingError;

/// Errors that can occur while loading a node description
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// A value in the config cannot be turned into a host value
    #[error("Invalid value at '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("Invalid pipeline description: {0}")]
    Binding(#[from] BindingError),
}
