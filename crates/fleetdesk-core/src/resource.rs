//! Cached client for one REST resource collection.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::api::{decode, ApiError, HttpRequest, Transport};
use crate::cache::{
    CacheEntry, CacheScope, CacheStatus, CacheTtl, Clock, Eligibility, FetchPolicy, Invalidate,
    Invalidator, ListDefaults, ListParams, Lookup, ResourceCache, SystemClock,
};

/// Where a listing's data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Fetched by this call
    Network,
    /// Fresh cached data; no request was made
    Cache,
    /// The fetch failed and cached data past its freshness window was served
    StaleFallback,
}

/// A list response together with its provenance.
#[derive(Debug, Clone, Serialize)]
pub struct Listing<T> {
    pub data: T,
    pub source: Source,
    pub stored_at: Option<DateTime<Utc>>,
}

impl<T> Listing<T> {
    fn network(data: T) -> Self {
        Self {
            data,
            source: Source::Network,
            stored_at: None,
        }
    }

    fn cached(entry: CacheEntry<T>) -> Self {
        Self {
            data: entry.data,
            source: Source::Cache,
            stored_at: Some(entry.stored_at),
        }
    }

    fn stale(entry: CacheEntry<T>) -> Self {
        Self {
            data: entry.data,
            source: Source::StaleFallback,
            stored_at: Some(entry.stored_at),
        }
    }

    /// True when the data was served in place of a failed fetch.
    pub fn is_stale(&self) -> bool {
        self.source == Source::StaleFallback
    }
}

/// Shared settings for building resource clients.
#[derive(Clone)]
pub struct ClientOptions {
    pub ttl: CacheTtl,
    pub scope: CacheScope,
    pub clock: Arc<dyn Clock>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            ttl: CacheTtl::default(),
            scope: CacheScope::default(),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Read/write access to one collection, with its own cache.
///
/// `list` goes through the fetch policy; `create`, `update` and `delete`
/// clear this collection's cache (and any registered dependents) once the
/// server has accepted the change.
pub struct ResourceClient<T> {
    name: String,
    path: String,
    transport: Arc<dyn Transport>,
    policy: FetchPolicy,
    cache: Arc<ResourceCache<T>>,
    invalidator: Invalidator,
}

impl<T> ResourceClient<T>
where
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    pub fn new(
        name: &str,
        path: &str,
        defaults: ListDefaults,
        transport: Arc<dyn Transport>,
        options: &ClientOptions,
    ) -> Self {
        let cache = Arc::new(ResourceCache::with_clock(
            name,
            options.ttl,
            options.scope,
            Arc::clone(&options.clock),
        ));
        let invalidator = Invalidator::new(cache.clone());

        Self {
            name: name.to_string(),
            path: path.trim_matches('/').to_string(),
            transport,
            policy: FetchPolicy::new(options.scope, defaults),
            cache,
            invalidator,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }

    pub fn cache(&self) -> &Arc<ResourceCache<T>> {
        &self.cache
    }

    /// Handle for registering this collection's cache as a dependent of another.
    pub fn cache_handle(&self) -> Arc<dyn Invalidate> {
        self.cache.clone()
    }

    /// Clear `dependent` as well whenever this collection is mutated.
    pub fn also_invalidates(&mut self, dependent: Arc<dyn Invalidate>) {
        self.invalidator.add(dependent);
    }

    pub fn invalidator(&self) -> &Invalidator {
        &self.invalidator
    }

    /// List the collection.
    ///
    /// Requests the policy marks as cacheable are answered from a fresh entry
    /// without any network call; otherwise they fetch (sharing a fetch already
    /// in flight for the same query) and store the result. If that fetch
    /// fails while a stored entry is still within its maximum age, the stored
    /// data is returned with `Source::StaleFallback` instead of the error.
    pub async fn list(&self, params: &ListParams) -> Result<Listing<T>, ApiError> {
        let request = HttpRequest::get(self.path.clone())
            .with_query(self.policy.defaults().query_for(params));

        let key = match self.policy.eligibility(params) {
            Eligibility::Bypass => {
                debug!(resource = %self.name, ?params, "Bypassing cache");
                let data = decode(self.transport.call(request).await?)?;
                return Ok(Listing::network(data));
            }
            Eligibility::Cacheable(key) => key,
        };

        let flight = match self.cache.lookup_or_fetch(&key, || {
            let transport = Arc::clone(&self.transport);
            async move { decode::<T>(transport.call(request).await?) }.boxed()
        }) {
            Lookup::Fresh(entry) => {
                debug!(resource = %self.name, key = %key, "Serving fresh cached data");
                return Ok(Listing::cached(entry));
            }
            Lookup::Fetch(flight) => flight,
        };

        let result = flight.fetch.await;

        // Only the first waiter to see the fetch finish commits its result.
        if self.cache.complete(&key, flight.fetch_id) {
            if let Ok(ref data) = result {
                self.cache
                    .store_if_current(key.clone(), data.clone(), flight.generation);
            }
        }

        match result {
            Ok(data) => Ok(Listing::network(data)),
            Err(err) => match self.cache.fallback(&key) {
                Some(entry) => {
                    warn!(
                        resource = %self.name,
                        key = %key,
                        error = %err,
                        stored_at = %entry.stored_at,
                        "Fetch failed, serving stale cached data"
                    );
                    Ok(Listing::stale(entry))
                }
                None => Err(err),
            },
        }
    }

    /// Create a record in the collection.
    pub async fn create<B, R>(&self, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = HttpRequest::post(self.path.clone(), body)?;
        self.mutate(request, "create").await
    }

    /// Replace the record with the given id.
    pub async fn update<B, R>(&self, id: impl std::fmt::Display, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = HttpRequest::put(format!("{}/{}", self.path, id), body)?;
        self.mutate(request, "update").await
    }

    /// Delete the record with the given id.
    pub async fn delete<R>(&self, id: impl std::fmt::Display) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let request = HttpRequest::delete(format!("{}/{}", self.path, id));
        self.mutate(request, "delete").await
    }

    async fn mutate<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
        action: &str,
    ) -> Result<R, ApiError> {
        // A failed write leaves the cache alone: it still describes the server.
        let value = self.transport.call(request).await?;
        self.invalidator
            .invalidate(&format!("{} {}", action, self.name));
        decode(value)
    }

    pub fn clear_cache(&self) {
        self.invalidator.invalidate(&format!("manual clear of {}", self.name));
    }

    /// Diagnostic snapshot of the canonical query's entry.
    pub fn cache_status(&self) -> CacheStatus {
        self.cache.status(&self.policy.canonical_key())
    }
}
