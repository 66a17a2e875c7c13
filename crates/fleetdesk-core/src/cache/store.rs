//! In-memory response cache for one resource collection.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::entry::{CacheEntry, CacheStatus, CacheTtl};
use super::policy::{CacheScope, QueryKey};
use crate::api::ApiError;

/// A network fetch that any number of callers can await together.
pub type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, ApiError>>>;

/// Handle on a fetch registered for a key.
pub struct Flight<T> {
    pub fetch: SharedFetch<T>,
    pub fetch_id: u64,
    /// Cache generation when the fetch was dispatched.
    pub generation: u64,
}

pub enum Lookup<T> {
    Fresh(CacheEntry<T>),
    Fetch(Flight<T>),
}

struct InFlight<T> {
    fetch_id: u64,
    generation: u64,
    fetch: SharedFetch<T>,
}

struct CacheState<T> {
    entries: LruCache<QueryKey, CacheEntry<T>>,
    in_flight: HashMap<QueryKey, InFlight<T>>,
    generation: u64,
    next_fetch_id: u64,
}

impl<T: Clone> CacheState<T> {
    /// Usable entry for `key`, dropping it first if it is dead.
    fn live(
        &mut self,
        key: &QueryKey,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Option<&CacheEntry<T>> {
        if self.entries.peek(key).is_some_and(|e| e.is_dead(now)) {
            self.entries.pop(key);
        }
        self.entries.get(key)
    }
}

/// Holds stored responses for one collection, with freshness and fallback
/// windows, a generation counter bumped by every `clear`, and the set of
/// fetches currently in flight.
///
/// The lock is never held across an await point.
pub struct ResourceCache<T> {
    name: String,
    ttl: CacheTtl,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState<T>>,
}

impl<T: Clone + Send + Sync + 'static> ResourceCache<T> {
    pub fn new(name: &str, ttl: CacheTtl, scope: CacheScope) -> Self {
        Self::with_clock(name, ttl, scope, Arc::new(SystemClock))
    }

    pub fn with_clock(
        name: &str,
        ttl: CacheTtl,
        scope: CacheScope,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let capacity = NonZeroUsize::new(scope.capacity()).unwrap_or(NonZeroUsize::MIN);
        Self {
            name: name.to_string(),
            ttl,
            clock,
            state: Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                in_flight: HashMap::new(),
                generation: 0,
                next_fetch_id: 0,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ttl(&self) -> CacheTtl {
        self.ttl
    }

    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    pub fn is_fresh(&self, key: &QueryKey) -> bool {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .peek(key)
            .is_some_and(|e| e.is_fresh(now))
    }

    pub fn is_usable_as_fallback(&self, key: &QueryKey) -> bool {
        let now = self.clock.now();
        self.state
            .lock()
            .entries
            .peek(key)
            .is_some_and(|e| e.is_usable(now))
    }

    /// The entry for `key` if it is still fresh.
    pub fn fresh(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.live(key, now).filter(|e| e.is_fresh(now)).cloned()
    }

    /// The entry for `key` if it may still stand in for a failed fetch.
    pub fn fallback(&self, key: &QueryKey) -> Option<CacheEntry<T>> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        state.live(key, now).cloned()
    }

    /// Overwrite the entry for `key`, restarting both windows.
    pub fn store(&self, key: QueryKey, data: T) {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let entry = CacheEntry::new(data, now, self.ttl, state.generation);
        if let Some((evicted, _)) = state.entries.push(key.clone(), entry) {
            if evicted != key {
                debug!(cache = %self.name, key = %evicted, "Evicted least recently used entry");
            }
        }
        debug!(cache = %self.name, key = %key, "Stored response");
    }

    /// Store only if no `clear` has happened since `generation` was observed.
    pub fn store_if_current(&self, key: QueryKey, data: T, generation: u64) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock();
        if state.generation != generation {
            let current = state.generation;
            drop(state);
            debug!(
                cache = %self.name,
                key = %key,
                dispatched = generation,
                current = current,
                "Discarding response fetched before invalidation"
            );
            return false;
        }
        let entry = CacheEntry::new(data, now, self.ttl, generation);
        state.entries.push(key.clone(), entry);
        drop(state);
        debug!(cache = %self.name, key = %key, "Stored response");
        true
    }

    /// Remove every entry and forget in-flight fetches.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.in_flight.clear();
        state.generation += 1;
    }

    /// Return the fresh entry for `key`, or join (or start) the fetch for it.
    ///
    /// Both decisions happen under one lock acquisition, so a caller never
    /// starts a fetch that another caller has already registered.
    pub fn lookup_or_fetch<F>(&self, key: &QueryKey, start: F) -> Lookup<T>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, ApiError>>,
    {
        let now = self.clock.now();
        let mut state = self.state.lock();

        if let Some(entry) = state.live(key, now).filter(|e| e.is_fresh(now)) {
            return Lookup::Fresh(entry.clone());
        }

        if let Some(flight) = state.in_flight.get(key) {
            debug!(cache = %self.name, key = %key, "Joining in-flight fetch");
            return Lookup::Fetch(Flight {
                fetch: flight.fetch.clone(),
                fetch_id: flight.fetch_id,
                generation: flight.generation,
            });
        }

        let fetch = start().shared();
        let fetch_id = state.next_fetch_id;
        state.next_fetch_id += 1;
        let generation = state.generation;
        state.in_flight.insert(
            key.clone(),
            InFlight {
                fetch_id,
                generation,
                fetch: fetch.clone(),
            },
        );

        Lookup::Fetch(Flight {
            fetch,
            fetch_id,
            generation,
        })
    }

    /// Unregister a finished fetch. Returns true for exactly one caller per
    /// fetch, and false for every fetch dropped by `clear`.
    pub fn complete(&self, key: &QueryKey, fetch_id: u64) -> bool {
        let mut state = self.state.lock();
        match state.in_flight.get(key) {
            Some(flight) if flight.fetch_id == fetch_id => {
                state.in_flight.remove(key);
                true
            }
            _ => false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.state.lock().in_flight.len()
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Diagnostic snapshot for `key`. No side effects.
    pub fn status(&self, key: &QueryKey) -> CacheStatus {
        let now = self.clock.now();
        let state = self.state.lock();
        let mut status = CacheStatus {
            entries: state.entries.len(),
            generation: state.generation,
            ..CacheStatus::default()
        };

        // dead entries count as absent
        if let Some(entry) = state.entries.peek(key).filter(|e| !e.is_dead(now)) {
            status.present = true;
            status.fresh = entry.is_fresh(now);
            status.usable = entry.is_usable(now);
            status.age_ms = Some(entry.age(now).num_milliseconds());
            status.expires_in_ms = Some((entry.fresh_until - now).num_milliseconds());
        }
        status
    }
}
