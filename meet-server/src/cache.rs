//! Caching layer for oracle responses.
//!
//! Keys round coordinates to 5 decimal places (about 1.1 m), so queries for
//! nearly the same point share one entry. Entries live for a fixed TTL and
//! are replaced wholesale. Failed fetches are never cached.
//!
//! Concurrent misses for the same key are not coalesced: each one calls the
//! oracle. Candidate sets are small, so the duplicate cost is bounded.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use moka::future::Cache as MokaCache;
use serde::Serialize;

use crate::domain::{GeoPoint, Place, PlaceCategory, RouteResult, TravelMode};
use crate::oracle::{OracleError, PlaceOracle, RoutingOracle};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per cache.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300),
            max_capacity: 10_000,
        }
    }
}

/// A coordinate rounded to 5 decimal places, stored as integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoundedPoint {
    lat_e5: i32,
    lng_e5: i32,
}

impl RoundedPoint {
    pub fn lat_e5(&self) -> i32 {
        self.lat_e5
    }

    pub fn lng_e5(&self) -> i32 {
        self.lng_e5
    }
}

impl From<GeoPoint> for RoundedPoint {
    fn from(p: GeoPoint) -> Self {
        // Validated coordinates are within ±180, so ±18_000_000 fits in i32.
        Self {
            lat_e5: (p.lat() * 1e5).round() as i32,
            lng_e5: (p.lng() * 1e5).round() as i32,
        }
    }
}

/// Cache key for routes: (origin, destination, mode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub origin: RoundedPoint,
    pub destination: RoundedPoint,
    pub mode: TravelMode,
}

impl RouteKey {
    pub fn new(origin: GeoPoint, destination: GeoPoint, mode: TravelMode) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            mode,
        }
    }
}

/// Cache key for place searches: (center, category, radius).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlacesKey {
    pub center: RoundedPoint,
    pub category: PlaceCategory,
    pub radius_m: u32,
}

impl PlacesKey {
    pub fn new(center: GeoPoint, category: PlaceCategory, radius_m: u32) -> Self {
        Self {
            center: center.into(),
            category,
            radius_m,
        }
    }
}

/// Request counters for one cache.
#[derive(Debug, Default)]
pub struct CacheMetrics {
    requests: AtomicU64,
    hits: AtomicU64,
    oracle_calls: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`CacheMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheMetricsSnapshot {
    pub requests: u64,
    pub hits: u64,
    pub oracle_calls: u64,
    pub failures: u64,
}

impl CacheMetrics {
    pub fn snapshot(&self) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

/// TTL cache of oracle results keyed by `K`.
pub struct QueryCache<K, V> {
    entries: MokaCache<K, Arc<V>>,
    metrics: CacheMetrics,
}

impl<K, V> QueryCache<K, V>
where
    K: Hash + Eq + Send + Sync + std::fmt::Debug + 'static,
    V: Send + Sync + 'static,
{
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            entries,
            metrics: CacheMetrics::default(),
        }
    }

    /// Return the cached value for `key`, or call `fetch` and cache its result.
    ///
    /// `fetch` is not called on a hit. Errors from `fetch` are returned
    /// without touching the cache.
    pub async fn get_or_fetch<F, Fut>(&self, key: K, fetch: F) -> Result<Arc<V>, OracleError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, OracleError>>,
    {
        self.metrics.requests.fetch_add(1, Ordering::Relaxed);

        // Try cache first
        if let Some(cached) = self.entries.get(&key).await {
            self.metrics.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(?key, "cache hit");
            return Ok(cached);
        }

        self.metrics.oracle_calls.fetch_add(1, Ordering::Relaxed);
        let value = match fetch().await {
            Ok(value) => Arc::new(value),
            Err(e) => {
                self.metrics.failures.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };

        self.entries.insert(key, value.clone()).await;
        Ok(value)
    }

    pub fn metrics(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }
}

/// Oracle with caching.
///
/// Wraps any routing and place oracle and caches both kinds of response.
pub struct CachedOracle<O> {
    oracle: O,
    routes: QueryCache<RouteKey, RouteResult>,
    places: QueryCache<PlacesKey, Vec<Place>>,
}

impl<O> CachedOracle<O>
where
    O: RoutingOracle + PlaceOracle,
{
    /// Create a new cached oracle.
    pub fn new(oracle: O, config: &CacheConfig) -> Self {
        Self {
            oracle,
            routes: QueryCache::new(config),
            places: QueryCache::new(config),
        }
    }

    /// Get a route, using the cache if available.
    pub async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Arc<RouteResult>, OracleError> {
        let key = RouteKey::new(origin, destination, mode);
        self.routes
            .get_or_fetch(key, || self.oracle.route(origin, destination, mode))
            .await
    }

    /// Search for places, using the cache if available.
    pub async fn nearby_search(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> Result<Arc<Vec<Place>>, OracleError> {
        let key = PlacesKey::new(center, category, radius_m);
        self.places
            .get_or_fetch(key, || self.oracle.nearby_search(center, radius_m, category))
            .await
    }

    /// Access the underlying oracle for operations that bypass cache.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn route_metrics(&self) -> CacheMetricsSnapshot {
        self.routes.metrics()
    }

    pub fn places_metrics(&self) -> CacheMetricsSnapshot {
        self.places.metrics()
    }
}
