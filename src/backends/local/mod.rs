// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod blocks;
pub mod factory;

pub use factory::{BlockConstructor, LocalEngine};
