//! Read-path eligibility: which list requests may touch the cache.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: SortDirection::Desc,
        }
    }
}

/// Parameters of one list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<Sort>,
    /// Skip the cache entirely for this call.
    pub force_refresh: bool,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: None,
            search: None,
            sort: None,
            force_refresh: false,
        }
    }
}

impl ListParams {
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn refresh(mut self) -> Self {
        self.force_refresh = true;
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// The values a collection's screens send when the user has not paged,
/// searched, or re-sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListDefaults {
    pub per_page: Option<u32>,
    pub sort: Option<Sort>,
}

impl ListDefaults {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Query string for a request, with defaults filled in.
    pub fn query_for(&self, params: &ListParams) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if params.page > 1 {
            query.push(("page".to_string(), params.page.to_string()));
        }
        if let Some(per_page) = params.per_page.or(self.per_page) {
            query.push(("per_page".to_string(), per_page.to_string()));
        }
        if let Some(sort) = params.sort.as_ref().or(self.sort.as_ref()) {
            query.push(("sort_field".to_string(), sort.field.clone()));
            query.push(("sort_direction".to_string(), sort.direction.as_str().to_string()));
        }
        if let Some(term) = params.search_term() {
            query.push(("search".to_string(), term.to_string()));
        }
        query
    }
}

/// Normalized identity of a list query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub page: u32,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub sort: Option<Sort>,
}

impl QueryKey {
    pub fn normalize(params: &ListParams, defaults: &ListDefaults) -> Self {
        Self {
            page: params.page.max(1),
            per_page: params.per_page.or(defaults.per_page),
            search: params.search_term().map(str::to_lowercase),
            sort: params.sort.clone().or_else(|| defaults.sort.clone()),
        }
    }

    /// The key of the request made with no overrides at all.
    pub fn canonical(defaults: &ListDefaults) -> Self {
        Self::normalize(&ListParams::default(), defaults)
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page={}", self.page)?;
        if let Some(per_page) = self.per_page {
            write!(f, " per_page={}", per_page)?;
        }
        if let Some(ref sort) = self.sort {
            write!(f, " sort={}:{}", sort.field, sort.direction.as_str())?;
        }
        if let Some(ref search) = self.search {
            write!(f, " search={:?}", search)?;
        }
        Ok(())
    }
}

/// Which queries a cache may hold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum CacheScope {
    /// Only the canonical query is cached: one slot per collection.
    #[default]
    Canonical,
    /// Every query is cached under its normalized key, up to `capacity`
    /// entries, least-recently-used evicted first.
    Keyed { capacity: usize },
}

impl CacheScope {
    pub fn capacity(&self) -> usize {
        match self {
            CacheScope::Canonical => 1,
            CacheScope::Keyed { capacity } => (*capacity).max(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    /// Straight to the network; the cache is neither read nor written.
    Bypass,
    Cacheable(QueryKey),
}

/// Decides cache eligibility for list requests of one collection.
#[derive(Debug, Clone)]
pub struct FetchPolicy {
    scope: CacheScope,
    defaults: ListDefaults,
}

impl FetchPolicy {
    pub fn new(scope: CacheScope, defaults: ListDefaults) -> Self {
        Self { scope, defaults }
    }

    pub fn defaults(&self) -> &ListDefaults {
        &self.defaults
    }

    pub fn canonical_key(&self) -> QueryKey {
        QueryKey::canonical(&self.defaults)
    }

    /// True when the request carries no override of the collection's defaults.
    pub fn is_canonical(&self, params: &ListParams) -> bool {
        !params.force_refresh && QueryKey::normalize(params, &self.defaults) == self.canonical_key()
    }

    pub fn eligibility(&self, params: &ListParams) -> Eligibility {
        if params.force_refresh {
            return Eligibility::Bypass;
        }

        let key = QueryKey::normalize(params, &self.defaults);
        match self.scope {
            CacheScope::Canonical if key != self.canonical_key() => Eligibility::Bypass,
            _ => Eligibility::Cacheable(key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicles_policy() -> FetchPolicy {
        FetchPolicy::new(
            CacheScope::Canonical,
            ListDefaults::none().sort(Sort::desc("created_at")),
        )
    }

    #[test]
    fn test_default_params_are_canonical() {
        let policy = vehicles_policy();
        assert!(policy.is_canonical(&ListParams::default()));
        assert_eq!(
            policy.eligibility(&ListParams::default()),
            Eligibility::Cacheable(policy.canonical_key())
        );
    }

    #[test]
    fn test_explicit_default_values_are_canonical() {
        let policy = vehicles_policy();
        let params = ListParams::default().sort(Sort::desc("created_at")).search("   ");
        assert!(policy.is_canonical(&params));
    }

    #[test]
    fn test_any_override_bypasses_in_canonical_scope() {
        let policy = vehicles_policy();
        let overrides = [
            ListParams::default().page(2),
            ListParams::default().per_page(25),
            ListParams::default().search("toyota"),
            ListParams::default().sort(Sort::asc("created_at")),
            ListParams::default().sort(Sort::desc("mileage")),
            ListParams::default().refresh(),
        ];
        for params in overrides {
            assert_eq!(policy.eligibility(&params), Eligibility::Bypass, "{params:?}");
            assert!(!policy.is_canonical(&params));
        }
    }

    #[test]
    fn test_keyed_scope_caches_overrides_under_normalized_key() {
        let policy = FetchPolicy::new(CacheScope::Keyed { capacity: 8 }, ListDefaults::none());
        let a = policy.eligibility(&ListParams::default().search("  Toyota "));
        let b = policy.eligibility(&ListParams::default().search("toyota"));
        assert_eq!(a, b);
        assert!(matches!(a, Eligibility::Cacheable(_)));

        assert_eq!(
            policy.eligibility(&ListParams::default().search("toyota").refresh()),
            Eligibility::Bypass
        );
    }

    #[test]
    fn test_query_fills_defaults() {
        let defaults = ListDefaults::none()
            .per_page(10)
            .sort(Sort::desc("service_date"));
        let query = defaults.query_for(&ListParams::default());
        assert_eq!(
            query,
            vec![
                ("per_page".to_string(), "10".to_string()),
                ("sort_field".to_string(), "service_date".to_string()),
                ("sort_direction".to_string(), "desc".to_string()),
            ]
        );

        let query = defaults.query_for(&ListParams::default().page(3).search(" brakes "));
        assert!(query.contains(&("page".to_string(), "3".to_string())));
        assert!(query.contains(&("search".to_string(), "brakes".to_string())));
    }

    #[test]
    fn test_first_page_is_not_sent() {
        let query = ListDefaults::none().query_for(&ListParams::default());
        assert!(query.is_empty());
    }

    #[test]
    fn test_scope_capacity() {
        assert_eq!(CacheScope::Canonical.capacity(), 1);
        assert_eq!(CacheScope::Keyed { capacity: 0 }.capacity(), 1);
        assert_eq!(CacheScope::Keyed { capacity: 16 }.capacity(), 16);
    }

    #[test]
    fn test_key_display() {
        let key = QueryKey::normalize(
            &ListParams::default().search("Brake"),
            &ListDefaults::none().per_page(10),
        );
        assert_eq!(key.to_string(), "page=1 per_page=10 search=\"brake\"");
    }
}
