//! Fair meeting point resolution.
//!
//! This module answers: "Where should two people meet so that neither
//! travels much longer than the other?"
//!
//! The pair of travel modes selects a [`Strategy`]. Strategies query routes
//! through the request queue (which consults the cache) and never fail
//! outright: when the oracle lets them down they fall back to a simpler
//! plan, and the result says so. Once the oracle rejects the credentials,
//! every later resolution returns the arithmetic midpoint without asking.

mod config;
mod cross_mode;
mod dispatch;
mod places;
mod resolver;
mod result;
mod same_mode;
mod stops;


use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::cache::{CacheConfig, CacheMetricsSnapshot, CachedOracle};
use crate::domain::{GeoPoint, Place, PlaceCategory, TravelMode, rank_by_rating};
use crate::oracle::{ErrorKind, PlaceOracle, RoutingOracle};
use crate::queue::{QueueConfig, QueueMetricsSnapshot, RequestQueue};

pub use config::EngineConfig;
pub use cross_mode::bias_multiplier;
pub use dispatch::{Party, Strategy};
pub use places::search_radius;
pub use resolver::{Resolver, RouteSource};
pub use result::{MeetingPointResult, PlaceRoutes, ResolveError};
pub use stops::{CandidateStop, StopKind, extract_stops};

/// Counters from the caches and the queue.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineMetrics {
    pub route_cache: CacheMetricsSnapshot,
    pub places_cache: CacheMetricsSnapshot,
    pub queue: QueueMetricsSnapshot,
}

/// The meeting point engine for one session.
pub struct MeetingPointEngine<O> {
    oracle: Arc<CachedOracle<O>>,
    queue: RequestQueue,
    config: EngineConfig,
    auth_denied: AtomicBool,
}

impl<O> MeetingPointEngine<O>
where
    O: RoutingOracle + PlaceOracle,
{
    /// Create an engine around `oracle`.
    ///
    /// Spawns the request queue worker, so this must be called from within
    /// a Tokio runtime.
    pub fn new(
        oracle: O,
        config: EngineConfig,
        cache_config: &CacheConfig,
        queue_config: QueueConfig,
    ) -> Self {
        let oracle = Arc::new(CachedOracle::new(oracle, cache_config));
        let queue = RequestQueue::spawn(oracle.clone(), queue_config);
        Self {
            oracle,
            queue,
            config,
            auth_denied: AtomicBool::new(false),
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults(oracle: O) -> Self {
        Self::new(
            oracle,
            EngineConfig::default(),
            &CacheConfig::default(),
            QueueConfig::default(),
        )
    }

    /// Find a fair meeting point for A at `a` travelling by `mode_a` and B
    /// at `b` travelling by `mode_b`.
    pub async fn resolve_meeting_point(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode_a: TravelMode,
        mode_b: TravelMode,
    ) -> MeetingPointResult {
        let strategy = Strategy::select(mode_a, mode_b);

        if self.is_auth_denied() {
            tracing::debug!("credentials rejected earlier, using midpoint");
            return MeetingPointResult::midpoint_fallback(a, b, strategy, ErrorKind::OracleAuth);
        }

        tracing::info!(strategy = strategy.name(), %a, %b, "resolving meeting point");

        let resolver = Resolver::new(&self.queue, &self.config);
        let outcome = match strategy {
            Strategy::SameMode { mode } => resolver.same_mode(a, b, mode).await,
            Strategy::StationaryWalker { walker } => {
                let mover_mode = walker.other().pick(mode_a, mode_b);
                let (stay, mover) = (walker.pick(a, b), walker.other().pick(a, b));
                resolver
                    .stationary_walker(stay, mover, walker, mover_mode)
                    .await
            }
            Strategy::TransitStopMatching { transit } => {
                resolver
                    .transit_stop_matching(transit.pick(a, b), transit.other().pick(a, b), transit)
                    .await
            }
            Strategy::WalkerWithTransitProbe { walker } => {
                resolver
                    .walker_with_transit_probe(walker.pick(a, b), walker.other().pick(a, b), walker)
                    .await
            }
        };

        match outcome {
            Ok(outcome) => {
                let result = outcome.into_result(strategy);
                tracing::info!(
                    point = %result.point,
                    time_a = ?result.time_a(),
                    time_b = ?result.time_b(),
                    used_fallback = result.used_fallback,
                    "resolved meeting point"
                );
                result
            }
            Err(e) => {
                self.note_error(&e);
                tracing::warn!(error = %e, "resolution failed, using midpoint");
                MeetingPointResult::midpoint_fallback(a, b, strategy, e.kind())
            }
        }
    }

    /// Places of `category` within `radius_m` of `point`, best-rated first.
    ///
    /// Returns an empty list when the search fails.
    pub async fn find_places(
        &self,
        point: GeoPoint,
        category: PlaceCategory,
        radius_m: u32,
    ) -> Vec<Place> {
        if self.is_auth_denied() {
            return Vec::new();
        }

        match self.oracle.nearby_search(point, radius_m, category).await {
            Ok(places) => rank_by_rating(places.as_ref().clone()),
            Err(e) => {
                if e.is_auth() {
                    self.auth_denied.store(true, Ordering::SeqCst);
                }
                tracing::warn!(
                    error = %e,
                    %point,
                    category = category.as_str(),
                    "place search failed"
                );
                Vec::new()
            }
        }
    }

    /// Route both parties to a chosen place.
    pub async fn routes_to_place(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode_a: TravelMode,
        mode_b: TravelMode,
        place: GeoPoint,
    ) -> Result<PlaceRoutes, ResolveError> {
        if self.is_auth_denied() {
            return Err(ResolveError::AuthDenied);
        }

        let resolver = Resolver::new(&self.queue, &self.config);
        resolver
            .routes_to_place(a, b, mode_a, mode_b, place)
            .await
            .inspect_err(|e| self.note_error(e))
    }

    /// True once the oracle has rejected this session's credentials.
    pub fn is_auth_denied(&self) -> bool {
        self.auth_denied.load(Ordering::SeqCst)
    }

    pub fn metrics(&self) -> EngineMetrics {
        EngineMetrics {
            route_cache: self.oracle.route_metrics(),
            places_cache: self.oracle.places_metrics(),
            queue: self.queue.metrics(),
        }
    }

    fn note_error(&self, e: &ResolveError) {
        if e.is_auth() && !self.auth_denied.swap(true, Ordering::SeqCst) {
            tracing::error!("oracle rejected the credentials, falling back to midpoints");
        }
    }
}
