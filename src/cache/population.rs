//! Populate-once slot with coalesced fetching
//!
//! Both caches keep their entity set in a [`Population`]. The slot moves
//! through `Empty -> Fetching -> Populated`; callers arriving while a fetch is
//! in flight join that fetch instead of starting another one. A failed fetch
//! puts the slot back to `Empty`, and a fetch that was superseded by an
//! invalidation never populates the slot.
//!
//! Local mutations patched in while a fetch is in flight are queued on the
//! fetch and replayed on its result before it is stored, so a response that
//! predates the mutation cannot hide it.
//!
//! A slot may be scoped by a key (the parent show of an episode list). Asking
//! for a different scope empties the slot in the same critical section that
//! records the new scope.

use crate::remote::RemoteError;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, RemoteError>>>;
type Update<T> = Box<dyn FnOnce(&mut T) + Send>;

enum Slot<T> {
    Empty,
    Fetching {
        generation: u64,
        fetch: SharedFetch<T>,
        /// Patches received while the fetch is in flight
        pending: Vec<Update<T>>,
    },
    Populated {
        generation: u64,
        value: T,
    },
}

struct State<T, K> {
    scope: Option<K>,
    slot: Slot<T>,
    /// Incremented for every fetch started, identifies which fetch owns the slot
    generation: u64,
}

/// A lazily populated value shared by all callers of a cache
pub(crate) struct Population<T, K = ()> {
    state: Mutex<State<T, K>>,
}

impl<T, K> Population<T, K>
where
    T: Clone + Send + Sync + 'static,
    K: Clone + PartialEq,
{
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                scope: None,
                slot: Slot::Empty,
                generation: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State<T, K>> {
        // Never held across an await; a poisoned lock still guards a valid slot.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value for `scope`, fetching it first if the slot is empty.
    ///
    /// A scope different from the current one invalidates the slot first.
    /// `fetch` is only invoked when no value is present and no fetch is in
    /// flight; concurrent callers share the single in-flight fetch and all
    /// receive its outcome.
    pub async fn get_or_fetch<F, Fut>(&self, scope: K, fetch: F) -> Result<T, RemoteError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>> + Send + 'static,
    {
        let (generation, shared) = {
            let mut state = self.lock();
            if state.scope.as_ref() != Some(&scope) {
                state.scope = Some(scope);
                state.slot = Slot::Empty;
            }

            match &state.slot {
                Slot::Populated { value, .. } => return Ok(value.clone()),
                Slot::Fetching {
                    generation,
                    fetch: in_flight,
                    ..
                } => (*generation, in_flight.clone()),
                Slot::Empty => {
                    state.generation += 1;
                    let generation = state.generation;
                    let shared = fetch().boxed().shared();
                    state.slot = Slot::Fetching {
                        generation,
                        fetch: shared.clone(),
                        pending: Vec::new(),
                    };
                    (generation, shared)
                }
            }
        };

        let outcome = shared.await;

        let mut state = self.lock();
        let owns_slot = matches!(
            &state.slot,
            Slot::Fetching { generation: owner, .. } if *owner == generation
        );
        if owns_slot {
            let pending = match std::mem::replace(&mut state.slot, Slot::Empty) {
                Slot::Fetching { pending, .. } => pending,
                _ => Vec::new(),
            };
            let mut value = outcome?;
            if !pending.is_empty() {
                tracing::debug!(count = pending.len(), "Replaying patches on fetched value");
            }
            for update in pending {
                update(&mut value);
            }
            state.slot = Slot::Populated {
                generation,
                value: value.clone(),
            };
            return Ok(value);
        }

        match &state.slot {
            // Another caller of the same fetch settled the slot first; local
            // mutations may already have been applied on top of it.
            Slot::Populated {
                generation: owner,
                value,
            } if *owner == generation && outcome.is_ok() => Ok(value.clone()),
            _ => outcome,
        }
    }

    /// Returns the scope of the last request
    pub fn scope(&self) -> Option<K> {
        self.lock().scope.clone()
    }

    /// Whether the slot holds a value for `scope`
    pub fn is_populated(&self, scope: &K) -> bool {
        self.read(scope, |_| ()).is_some()
    }

    /// Runs `inspect` on the value if the slot is populated for `scope`
    pub fn read<R>(&self, scope: &K, inspect: impl FnOnce(&T) -> R) -> Option<R> {
        let state = self.lock();
        if state.scope.as_ref() != Some(scope) {
            return None;
        }
        match &state.slot {
            Slot::Populated { value, .. } => Some(inspect(value)),
            _ => None,
        }
    }

    /// Applies `update` to the value held for `scope`.
    ///
    /// A populated slot is updated right away. While a fetch for `scope` is
    /// in flight the update is queued and applied to its result before that
    /// result is stored and handed to the callers. Returns `false` without
    /// calling `update` if the slot holds nothing for `scope`.
    pub fn patch(&self, scope: &K, update: impl FnOnce(&mut T) + Send + 'static) -> bool {
        let mut state = self.lock();
        if state.scope.as_ref() != Some(scope) {
            return false;
        }
        match &mut state.slot {
            Slot::Populated { value, .. } => {
                update(value);
                true
            }
            Slot::Fetching { pending, .. } => {
                pending.push(Box::new(update));
                true
            }
            Slot::Empty => false,
        }
    }

    /// Drops the value and scope, detaching any in-flight fetch
    pub fn invalidate(&self) {
        let mut state = self.lock();
        state.scope = None;
        state.slot = Slot::Empty;
    }
}
