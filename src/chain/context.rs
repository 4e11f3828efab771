// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-thread "current chain" used while building chains.
//!
//! ```
//! use the_chainwright::backends::local::LocalEngine;
//! use the_chainwright::bindings::Bindings;
//! use the_chainwright::chain::ChainScope;
//! use std::sync::Arc;
//!
//! let bindings = Bindings::new(Arc::new(LocalEngine::with_core_blocks()));
//! let scope = ChainScope::enter(bindings.chain("hello"));
//! bindings.block("Msg").param("message", "hello").append()?;
//! let chain = scope.finish()?;
//! assert_eq!(chain.block_names(), vec!["Msg"]);
//! # Ok::<(), the_chainwright::errors::BindingError>(())
//! ```

use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::bindings::BlockHandle;
use crate::chain::Chain;
use crate::errors::BindingError;
use crate::observability::messages::{chain::*, StructuredLog};

thread_local! {
    static CURRENT: RefCell<Vec<(u64, Chain)>> = const { RefCell::new(Vec::new()) };
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Guard that keeps a chain current on this thread until it is finished or dropped.
///
/// Scopes nest; the innermost live scope is the current chain. The guard is
/// tied to the thread that created it.
#[must_use = "dropping a scope discards its chain"]
pub struct ChainScope {
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl ChainScope {
    pub fn enter(chain: Chain) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let depth = CURRENT.with(|stack| {
            let mut stack = stack.borrow_mut();
            ScopeEntered {
                chain: chain.name(),
                depth: stack.len() + 1,
            }
            .log();
            stack.push((id, chain));
            stack.len()
        });
        tracing::trace!(scope = id, depth, "chain scope pushed");
        Self {
            id,
            _not_send: PhantomData,
        }
    }

    /// Leave the scope and take back its chain.
    pub fn finish(self) -> Result<Chain, BindingError> {
        take(self.id).ok_or(BindingError::NoCurrentChain)
    }
}

impl Drop for ChainScope {
    fn drop(&mut self) {
        if let Some(chain) = take(self.id) {
            ScopeDiscarded {
                chain: chain.name(),
                blocks: chain.len(),
            }
            .log();
        }
    }
}

fn take(id: u64) -> Option<Chain> {
    // The chain is moved out before the borrow ends so that block cleanup never
    // runs while the stack is borrowed.
    CURRENT.with(|stack| {
        let mut stack = stack.borrow_mut();
        let position = stack.iter().position(|(scope, _)| *scope == id)?;
        Some(stack.remove(position).1)
    })
}

/// Append to the innermost current chain of this thread.
pub fn append_to_current(block: BlockHandle) -> Result<(), BindingError> {
    // A rejected block leaves the borrow before it is dropped, so its cleanup
    // may look at the current chain.
    let outcome = CURRENT.with(|stack| match stack.borrow_mut().last_mut() {
        Some((_, chain)) => chain.try_append(block),
        None => Err((BindingError::NoCurrentChain, block)),
    });
    outcome.map_err(|(error, rejected)| {
        drop(rejected);
        error
    })
}

pub fn current_chain_name() -> Option<String> {
    with_current_chain(|chain| chain.name().to_string())
}

pub fn with_current_chain<R>(f: impl FnOnce(&Chain) -> R) -> Option<R> {
    CURRENT.with(|stack| stack.borrow().last().map(|(_, chain)| f(chain)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::backends::stub::StubBlock;
    use crate::errors::BlockError;
    use crate::node::ActivationContext;
    use crate::traits::{Block, Flow};
    use crate::types::{TaggedValue, TypeSet, TypeTag};

    fn stub(name: &str) -> BlockHandle {
        BlockHandle::new(Box::new(StubBlock::new(name)))
    }

    #[test]
    fn test_append_without_scope_fails() {
        let err = append_to_current(stub("A")).unwrap_err();
        assert!(matches!(err, BindingError::NoCurrentChain));
        assert_eq!(current_chain_name(), None);
    }

    #[test]
    fn test_nested_scopes_restore_previous_chain() {
        let outer = ChainScope::enter(Chain::new("outer"));
        append_to_current(stub("A")).unwrap();

        let inner = ChainScope::enter(Chain::new("inner"));
        assert_eq!(current_chain_name().as_deref(), Some("inner"));
        append_to_current(stub("B")).unwrap();
        let inner_chain = inner.finish().unwrap();

        assert_eq!(current_chain_name().as_deref(), Some("outer"));
        append_to_current(stub("C")).unwrap();
        let outer_chain = outer.finish().unwrap();

        assert_eq!(inner_chain.block_names(), vec!["B"]);
        assert_eq!(outer_chain.block_names(), vec!["A", "C"]);
        assert_eq!(current_chain_name(), None);
    }

    #[test]
    fn test_out_of_order_exit_removes_only_its_own_chain() {
        let outer = ChainScope::enter(Chain::new("outer"));
        let inner = ChainScope::enter(Chain::new("inner"));

        let outer_chain = outer.finish().unwrap();
        assert_eq!(outer_chain.name(), "outer");
        assert_eq!(current_chain_name().as_deref(), Some("inner"));

        drop(inner);
        assert_eq!(current_chain_name(), None);
    }

    #[test]
    fn test_rejected_append_through_scope() {
        let scope = ChainScope::enter(Chain::new("typed"));
        append_to_current(BlockHandle::new(Box::new(
            StubBlock::new("A").with_types([TypeTag::None], [TypeTag::Int]),
        )))
        .unwrap();

        let err = append_to_current(BlockHandle::new(Box::new(
            StubBlock::new("B").with_types([TypeTag::String], [TypeTag::String]),
        )))
        .unwrap_err();
        assert!(matches!(err, BindingError::IncompatibleConnection { .. }));
        assert_eq!(with_current_chain(|c| c.len()), Some(1));
        drop(scope);
    }

    /// Records which chain was current when its cleanup ran.
    struct ScopeAwareBlock {
        seen: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl Block for ScopeAwareBlock {
        fn name(&self) -> &str {
            "ScopeAware"
        }

        fn input_types(&self) -> TypeSet {
            TypeSet::from([TypeTag::String])
        }

        fn output_types(&self) -> TypeSet {
            TypeSet::from([TypeTag::String])
        }

        fn activate(&mut self, _ctx: &mut ActivationContext<'_>, input: TaggedValue) -> Result<Flow, BlockError> {
            Ok(Flow::Continue(input))
        }

        fn cleanup(&mut self) {
            self.seen.lock().unwrap().push(current_chain_name());
        }
    }

    #[test]
    fn test_rejected_block_cleanup_can_read_the_current_chain() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let scope = ChainScope::enter(Chain::new("typed"));
        append_to_current(BlockHandle::new(Box::new(
            StubBlock::new("A").with_types([TypeTag::None], [TypeTag::Int]),
        )))
        .unwrap();

        let err = append_to_current(BlockHandle::new(Box::new(ScopeAwareBlock { seen: seen.clone() })))
            .unwrap_err();
        assert!(matches!(err, BindingError::IncompatibleConnection { .. }));
        assert_eq!(*seen.lock().unwrap(), vec![Some("typed".to_string())]);
        drop(scope);

        let err = append_to_current(BlockHandle::new(Box::new(ScopeAwareBlock { seen: seen.clone() })))
            .unwrap_err();
        assert!(matches!(err, BindingError::NoCurrentChain));
        assert_eq!(seen.lock().unwrap().last(), Some(&None));
    }

    #[test]
    fn test_each_thread_has_its_own_stack() {
        let _scope = ChainScope::enter(Chain::new("main-thread"));
        let seen = std::thread::spawn(current_chain_name).join().unwrap();
        assert_eq!(seen, None);
        assert_eq!(current_chain_name().as_deref(), Some("main-thread"));
    }
}
