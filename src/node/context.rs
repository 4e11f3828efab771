// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::types::TaggedValue;

/// Thread-safe request to stop a node at its next safe point.
///
/// Clones share one cancellation token, so a request made through any clone
/// also wakes a `run` loop that is sleeping between ticks.
#[derive(Debug, Clone, Default)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.token.cancel();
    }

    pub fn is_requested(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once a stop has been requested.
    pub async fn requested(&self) {
        self.token.cancelled().await;
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// What a block sees of its node while it is being activated.
///
/// Safe chains write globals into a per-chain staging area that the node
/// commits when the tick ends; they read their own staged writes first.
/// Unsafe chains write straight into the committed map.
pub struct ActivationContext<'a> {
    chain: &'a str,
    now: Instant,
    unsafe_: bool,
    committed: &'a mut HashMap<String, TaggedValue>,
    staged: &'a mut HashMap<String, TaggedValue>,
    stop: &'a StopHandle,
}

impl<'a> ActivationContext<'a> {
    pub(crate) fn new(
        chain: &'a str,
        now: Instant,
        unsafe_: bool,
        committed: &'a mut HashMap<String, TaggedValue>,
        staged: &'a mut HashMap<String, TaggedValue>,
        stop: &'a StopHandle,
    ) -> Self {
        Self {
            chain,
            now,
            unsafe_,
            committed,
            staged,
            stop,
        }
    }

    pub fn chain_name(&self) -> &str {
        self.chain
    }

    /// Clock reading taken when the tick began
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn is_unsafe(&self) -> bool {
        self.unsafe_
    }

    pub fn get_global(&self, name: &str) -> Option<&TaggedValue> {
        self.staged.get(name).or_else(|| self.committed.get(name))
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: TaggedValue) {
        if self.unsafe_ {
            self.committed.insert(name.into(), value);
        } else {
            self.staged.insert(name.into(), value);
        }
    }

    /// Ask the node to stop once this activation returns.
    pub fn request_node_stop(&self) {
        self.stop.request();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_writes_are_staged_and_read_back() {
        let mut committed = HashMap::new();
        let mut staged = HashMap::new();
        let stop = StopHandle::new();
        let mut ctx = ActivationContext::new("a", Instant::now(), false, &mut committed, &mut staged, &stop);

        ctx.set_global("x", TaggedValue::Int(1));
        assert_eq!(ctx.get_global("x"), Some(&TaggedValue::Int(1)));
        drop(ctx);

        assert!(committed.is_empty());
        assert_eq!(staged.get("x"), Some(&TaggedValue::Int(1)));
    }

    #[test]
    fn test_unsafe_writes_go_straight_through() {
        let mut committed = HashMap::new();
        let mut staged = HashMap::new();
        let stop = StopHandle::new();
        let mut ctx = ActivationContext::new("a", Instant::now(), true, &mut committed, &mut staged, &stop);

        ctx.set_global("x", TaggedValue::Int(2));
        drop(ctx);

        assert_eq!(committed.get("x"), Some(&TaggedValue::Int(2)));
        assert!(staged.is_empty());
    }

    #[test]
    fn test_stop_handle_clones_share_state() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_requested());
        clone.request();
        assert!(handle.is_requested());
        assert!(handle.token().is_cancelled());
    }

    #[tokio::test]
    async fn test_requested_wakes_waiters() {
        let handle = StopHandle::new();
        let clone = handle.clone();
        let waiter = tokio::spawn(async move { clone.requested().await });

        handle.request();
        tokio::time::timeout(std::time::Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
