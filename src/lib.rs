// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // block engines
pub mod bindings;   // host-facing block construction
pub mod chain;      // chains + current-chain context
pub mod config;     // node descriptions
pub mod descriptor;
pub mod errors;     // error handling
pub mod generator;  // binding stub generation
pub mod node;       // cooperative scheduler
pub mod observability;
pub mod traits;     // unified abstractions
pub mod types;      // type tags + tagged values
pub mod validation;
