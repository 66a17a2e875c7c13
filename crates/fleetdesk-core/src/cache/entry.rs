use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

/// Data is served without a network call for 5 minutes after it is stored.
pub const DEFAULT_FRESH_SECS: i64 = 5 * 60;

/// Data may stand in for a failed fetch for up to 10 minutes after it is stored.
pub const DEFAULT_MAX_AGE_SECS: i64 = 10 * 60;

/// Longest window a cache accepts: one year.
pub const MAX_WINDOW_SECS: i64 = 365 * 24 * 60 * 60;

/// Freshness and fallback windows for one cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtl {
    fresh_for: Duration,
    max_age: Duration,
}

impl CacheTtl {
    /// Both windows are clamped to `[0, MAX_WINDOW_SECS]`. `max_age` shorter
    /// than `fresh_for` is raised to `fresh_for`, so an entry is never fresh
    /// without also being usable as a fallback.
    pub fn new(fresh_for: Duration, max_age: Duration) -> Self {
        let ceiling = Duration::seconds(MAX_WINDOW_SECS);
        let fresh_for = fresh_for.clamp(Duration::zero(), ceiling);
        Self {
            fresh_for,
            max_age: max_age.clamp(fresh_for, ceiling),
        }
    }

    pub fn from_secs(fresh_secs: i64, max_age_secs: i64) -> Self {
        let window = |secs: i64| Duration::seconds(secs.clamp(0, MAX_WINDOW_SECS));
        Self::new(window(fresh_secs), window(max_age_secs))
    }

    pub fn fresh_for(&self) -> Duration {
        self.fresh_for
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }
}

impl Default for CacheTtl {
    fn default() -> Self {
        Self::from_secs(DEFAULT_FRESH_SECS, DEFAULT_MAX_AGE_SECS)
    }
}

/// One stored response body with its deadlines.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
    pub fresh_until: DateTime<Utc>,
    pub stale_until: DateTime<Utc>,
    pub generation: u64,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, now: DateTime<Utc>, ttl: CacheTtl, generation: u64) -> Self {
        Self {
            data,
            stored_at: now,
            fresh_until: now + ttl.fresh_for,
            stale_until: now + ttl.max_age,
            generation,
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.fresh_until
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        now < self.stale_until
    }

    /// Dead entries are treated as absent by every read path.
    pub fn is_dead(&self, now: DateTime<Utc>) -> bool {
        !self.is_usable(now)
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.stored_at
    }
}

/// Read-only diagnostic snapshot of a cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    pub present: bool,
    pub fresh: bool,
    pub usable: bool,
    pub age_ms: Option<i64>,
    pub expires_in_ms: Option<i64>,
    pub entries: usize,
    pub generation: u64,
}

impl CacheStatus {
    pub fn age_minutes(&self) -> Option<i64> {
        self.age_ms.map(|ms| ms / 60_000)
    }

    pub fn age_display(&self) -> String {
        let Some(minutes) = self.age_minutes() else {
            return "never".to_string();
        };

        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                // Round up: 1h 30m+ becomes 2h
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    /// One-word state for status listings
    pub fn state_label(&self) -> &'static str {
        if !self.present || !self.usable {
            "empty"
        } else if self.fresh {
            "fresh"
        } else {
            "stale"
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
