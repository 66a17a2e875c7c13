//! In-memory caching of collection responses.
//!
//! Each resource collection owns one `ResourceCache`. A stored response is
//! served without a network call while fresh (5 minutes by default), may
//! stand in for a failed fetch until its maximum age (10 minutes by default),
//! and is never served after that.
//!
//! - `FetchPolicy` decides which list requests may use the cache at all
//! - `Invalidator` clears caches after successful mutations
//! - `Clock` makes expiry testable

pub mod clock;
pub mod entry;
pub mod invalidator;
pub mod policy;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{
    CacheEntry, CacheStatus, CacheTtl, DEFAULT_FRESH_SECS, DEFAULT_MAX_AGE_SECS, MAX_WINDOW_SECS,
};
pub use invalidator::{Invalidate, Invalidator};
pub use policy::{
    CacheScope, Eligibility, FetchPolicy, ListDefaults, ListParams, QueryKey, Sort, SortDirection,
};
pub use store::{Flight, Lookup, ResourceCache, SharedFetch};
