//! Mutation-triggered cache clearing.

use std::sync::Arc;

use tracing::info;

use super::store::ResourceCache;

/// Something that can be emptied after a write makes it outdated.
pub trait Invalidate: Send + Sync {
    fn invalidate(&self);
    fn label(&self) -> &str;
}

impl<T: Clone + Send + Sync + 'static> Invalidate for ResourceCache<T> {
    fn invalidate(&self) {
        self.clear();
    }

    fn label(&self) -> &str {
        self.name()
    }
}

/// Clears a collection's cache, and the caches of collections derived from
/// it, after a successful mutation.
#[derive(Clone)]
pub struct Invalidator {
    targets: Vec<Arc<dyn Invalidate>>,
}

impl Invalidator {
    pub fn new(own: Arc<dyn Invalidate>) -> Self {
        Self { targets: vec![own] }
    }

    /// Also clear `dependent` whenever this collection is mutated.
    pub fn add(&mut self, dependent: Arc<dyn Invalidate>) {
        if !self.targets.iter().any(|t| Arc::ptr_eq(t, &dependent)) {
            self.targets.push(dependent);
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.targets.iter().map(|t| t.label()).collect()
    }

    pub fn invalidate(&self, reason: &str) {
        for target in &self.targets {
            target.invalidate();
        }
        info!(reason = reason, caches = ?self.labels(), "Invalidated caches");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::entry::CacheTtl;
    use crate::cache::policy::{CacheScope, ListDefaults, QueryKey};

    fn cache(name: &str) -> Arc<ResourceCache<u32>> {
        Arc::new(ResourceCache::new(name, CacheTtl::default(), CacheScope::Canonical))
    }

    #[test]
    fn test_invalidate_clears_own_and_dependent_caches() {
        let key = QueryKey::canonical(&ListDefaults::none());
        let vehicles = cache("vehicles");
        let statistics = cache("statistics");
        vehicles.store(key.clone(), 1);
        statistics.store(key.clone(), 2);

        let mut invalidator = Invalidator::new(vehicles.clone());
        invalidator.add(statistics.clone());
        invalidator.invalidate("update");

        assert!(vehicles.is_empty());
        assert!(statistics.is_empty());
    }

    #[test]
    fn test_dependents_are_not_registered_twice() {
        let vehicles = cache("vehicles");
        let statistics = cache("statistics");
        let mut invalidator = Invalidator::new(vehicles.clone());
        invalidator.add(statistics.clone());
        invalidator.add(statistics.clone());
        assert_eq!(invalidator.labels(), vec!["vehicles", "statistics"]);
    }
}
