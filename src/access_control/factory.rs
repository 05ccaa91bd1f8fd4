//! Permission verifier factory
//!
//! Derives verifiers from the [`AuthorizationIndex`] and caches them by
//! scope set. Verifier construction is pure, so two requests racing on the
//! same new scope set may both build one; the first insert wins and both
//! get the cached instance back.

use crate::access_control::index::AuthorizationIndex;
use crate::access_control::scopes::ScopeSet;
use crate::access_control::verifier::PermissionVerifier;
use crate::config::CacheConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Statistics about cache performance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of cached scope sets
    pub entries: usize,
}

impl CacheStats {
    /// Calculates the cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Builds and caches per-scope-set verifiers
pub struct VerifierFactory {
    index: Arc<AuthorizationIndex>,
    cache: DashMap<ScopeSet, Arc<PermissionVerifier>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VerifierFactory {
    pub fn new(index: Arc<AuthorizationIndex>, config: CacheConfig) -> Self {
        Self {
            index,
            cache: DashMap::new(),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Get the verifier for a scope set
    pub fn verifier_for(&self, scopes: &ScopeSet) -> Arc<PermissionVerifier> {
        if !self.config.enabled {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Arc::new(self.index.build_verifier(scopes));
        }

        if let Some(cached) = self.cache.get(scopes) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            debug!(scopes = %scopes, "Verifier cache hit");
            return Arc::clone(cached.value());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let built = Arc::new(self.index.build_verifier(scopes));
        debug!(
            scopes = %scopes,
            clients = ?built.clients(),
            "Verifier cache miss"
        );

        if self.cache.len() >= self.config.max_entries && !self.cache.contains_key(scopes) {
            debug!(
                max_entries = self.config.max_entries,
                "Verifier cache full; not caching"
            );
            return built;
        }

        let entry = self.cache.entry(scopes.clone()).or_insert(built);
        Arc::clone(entry.value())
    }

    pub fn index(&self) -> &Arc<AuthorizationIndex> {
        &self.index
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::schema::Schema;
    use std::collections::BTreeMap;

    fn index() -> Arc<AuthorizationIndex> {
        let schema = Arc::new(
            Schema::parse("type Query { user: User } type User { id: ID! ssn: String }").unwrap(),
        );
        let clients = BTreeMap::from([
            ("public".to_string(), ClientConfig::new(["{ user { id } }"])),
            ("admin".to_string(), ClientConfig::new(["{ user { ssn } }"])),
        ]);
        Arc::new(AuthorizationIndex::build(schema, &clients).unwrap())
    }

    fn scopes(values: &[&str]) -> ScopeSet {
        values.iter().copied().collect()
    }

    #[test]
    fn test_same_scopes_share_instance() {
        let factory = VerifierFactory::new(index(), CacheConfig::default());
        let first = factory.verifier_for(&scopes(&["public", "admin"]));
        let second = factory.verifier_for(&scopes(&["admin", "public"]));
        assert!(Arc::ptr_eq(&first, &second));

        let stats = factory.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disabled_cache_builds_fresh() {
        let config = CacheConfig {
            enabled: false,
            ..Default::default()
        };
        let factory = VerifierFactory::new(index(), config);
        let first = factory.verifier_for(&scopes(&["public"]));
        let second = factory.verifier_for(&scopes(&["public"]));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(factory.stats().entries, 0);
    }

    #[test]
    fn test_full_cache_still_answers() {
        let config = CacheConfig {
            enabled: true,
            max_entries: 1,
        };
        let factory = VerifierFactory::new(index(), config);
        factory.verifier_for(&scopes(&["public"]));
        let admin = factory.verifier_for(&scopes(&["admin"]));
        assert!(admin.is_field_allowed("User", "ssn"));
        assert_eq!(factory.stats().entries, 1);
    }
}
