//! Short-lived read-through cache for categorized views.
//!
//! # Invariants
//! - An entry is served only while `now - stored_at < ttl`.
//! - A zero TTL disables caching entirely.
//! - Writers must call [`ViewCache::invalidate`]; the store does so on every
//!   save, successful or not.

use super::view::CategorizedView;
use std::time::{Duration, Instant};

/// Default freshness window for cached views.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5);

/// Cache object injected into a card store.
///
/// Time is passed in by the caller so expiry is testable without sleeping.
#[derive(Debug, Clone)]
pub struct ViewCache {
    ttl: Duration,
    entry: Option<(CategorizedView, Instant)>,
}

impl ViewCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entry: None }
    }

    /// Cache that never stores anything.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Returns a copy of the cached view while it is fresh.
    pub fn get(&self, now: Instant) -> Option<CategorizedView> {
        let (view, stored_at) = self.entry.as_ref()?;
        if now.saturating_duration_since(*stored_at) < self.ttl {
            Some(view.clone())
        } else {
            None
        }
    }

    pub fn put(&mut self, view: &CategorizedView, now: Instant) {
        if self.is_enabled() {
            self.entry = Some((view.clone(), now));
        }
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::ViewCache;
    use crate::model::card::{Card, Category};
    use crate::repo::view::CategorizedView;
    use std::time::{Duration, Instant};

    fn sample_view() -> CategorizedView {
        let mut view = CategorizedView::default();
        view.push(Card::new(Category::Design, "q", "a"));
        view
    }

    #[test]
    fn serves_entry_until_ttl_elapses() {
        let mut cache = ViewCache::new(Duration::from_secs(5));
        let start = Instant::now();
        cache.put(&sample_view(), start);

        assert!(cache.get(start + Duration::from_secs(4)).is_some());
        assert!(cache.get(start + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn invalidate_drops_entry() {
        let mut cache = ViewCache::default();
        let now = Instant::now();
        cache.put(&sample_view(), now);
        cache.invalidate();
        assert!(cache.get(now).is_none());
    }

    #[test]
    fn disabled_cache_never_serves() {
        let mut cache = ViewCache::disabled();
        let now = Instant::now();
        cache.put(&sample_view(), now);
        assert!(!cache.is_enabled());
        assert!(cache.get(now).is_none());
    }
}
