//! A process-wide cache of backend connection pools.
//!
//! The cache is an explicit service handed to the request path, not a
//! global: its lifetime is the server's, and tests can construct their own.
//! It is keyed by a stable serialization of the full route configuration,
//! so routes with identical backend settings share one pool. Creation is
//! lazy and single-flight: concurrent first access to a key yields exactly
//! one pool. Entries are never evicted or closed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

use datarest_configuration::RouteConfig;

use crate::error::Error;
use crate::pool::Pool;

#[derive(Default)]
pub struct ConnectionCache {
    entries: Mutex<HashMap<String, Arc<OnceCell<Pool>>>>,
    created: AtomicUsize,
}

impl ConnectionCache {
    pub fn new() -> ConnectionCache {
        ConnectionCache::default()
    }

    /// Get the pool for a configuration key, connecting on first use. A
    /// failed connection attempt leaves the entry empty, so a later request
    /// retries.
    pub async fn get_or_connect(&self, key: &str, config: &RouteConfig) -> Result<Pool, Error> {
        let cell = {
            let mut entries = self.entries.lock().await;
            entries.entry(key.to_string()).or_default().clone()
        };
        let pool = cell
            .get_or_try_init(|| async {
                self.created.fetch_add(1, Ordering::Relaxed);
                tracing::info!(backend = ?config.backend, url = %config.url, "opening connection pool");
                Pool::connect(config).await
            })
            .await?;
        Ok(pool.clone())
    }

    /// How many pools this cache has actually opened. Observability hook;
    /// also lets tests assert that creation is singular.
    pub fn created_connections(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datarest_configuration::{make_runtime_config, ParsedRouteConfig};
    use std::collections::BTreeMap;

    fn memory_config(table: &str) -> RouteConfig {
        make_runtime_config(ParsedRouteConfig {
            backend: "sqlite".to_string(),
            url: "sqlite::memory:".to_string(),
            table: table.to_string(),
            parameters: BTreeMap::new(),
            query: BTreeMap::new(),
            default: BTreeMap::new(),
            headers: BTreeMap::new(),
            posttransform: None,
            strict_filters: false,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn concurrent_first_access_creates_one_pool() {
        let cache = Arc::new(ConnectionCache::new());
        let config = memory_config("flags");
        let key = config.cache_key().unwrap();

        let (a, b) = tokio::join!(
            cache.get_or_connect(&key, &config),
            cache.get_or_connect(&key, &config),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(cache.created_connections(), 1);
    }

    #[tokio::test]
    async fn distinct_configurations_get_distinct_pools() {
        let cache = ConnectionCache::new();
        let flags = memory_config("flags");
        let countries = memory_config("countries");

        cache
            .get_or_connect(&flags.cache_key().unwrap(), &flags)
            .await
            .unwrap();
        cache
            .get_or_connect(&countries.cache_key().unwrap(), &countries)
            .await
            .unwrap();
        // Same key again reuses the existing pool.
        cache
            .get_or_connect(&flags.cache_key().unwrap(), &flags)
            .await
            .unwrap();

        assert_eq!(cache.created_connections(), 2);
    }
}
