//! Shared machinery for the resolution strategies.

use std::future::Future;
use std::sync::Arc;

use crate::domain::{GeoPoint, RouteResult, TravelMode, relative_gap, time_gap};
use crate::oracle::OracleError;
use crate::queue::RequestQueue;

use super::config::EngineConfig;

/// Source of routes for the strategies.
///
/// The engine uses the request queue; tests can route directly.
pub trait RouteSource: Send + Sync {
    fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> impl Future<Output = Result<Arc<RouteResult>, OracleError>> + Send;
}

impl RouteSource for RequestQueue {
    fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> impl Future<Output = Result<Arc<RouteResult>, OracleError>> + Send {
        self.enqueue(origin, destination, mode)
    }
}

/// A trial meeting point with both parties' routes to it.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub point: GeoPoint,
    /// Position between A (0) and B (1) the point was generated from.
    pub weight: f64,
    pub route_a: Arc<RouteResult>,
    pub route_b: Arc<RouteResult>,
}

impl Candidate {
    pub fn time_a(&self) -> u32 {
        self.route_a.total_duration_secs
    }

    pub fn time_b(&self) -> u32 {
        self.route_b.total_duration_secs
    }

    pub fn gap(&self) -> u32 {
        time_gap(self.time_a(), self.time_b())
    }

    pub fn relative_gap(&self) -> f64 {
        relative_gap(self.time_a(), self.time_b())
    }

    pub fn total(&self) -> u32 {
        self.time_a().saturating_add(self.time_b())
    }

    /// Smaller gap wins; equal gaps go to the lower total.
    pub fn beats(&self, other: &Candidate) -> bool {
        (self.gap(), self.total()) < (other.gap(), other.total())
    }
}

/// Keep whichever of `best` and `challenger` is fairer.
pub(crate) fn keep_better(best: &mut Option<Candidate>, challenger: Candidate) {
    match best {
        Some(current) if !challenger.beats(current) => {}
        _ => *best = Some(challenger),
    }
}

/// Combine the results of a paired query.
///
/// When both halves fail, a rejected-credentials error wins over the other,
/// so it always reaches the session flag.
pub(crate) fn both<T>(
    a: Result<T, OracleError>,
    b: Result<T, OracleError>,
) -> Result<(T, T), OracleError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (Err(ea), Err(eb)) if eb.is_auth() && !ea.is_auth() => Err(eb),
        (Err(e), _) | (_, Err(e)) => Err(e),
    }
}

/// Runs strategies against a route source.
pub struct Resolver<'a, R> {
    pub(crate) source: &'a R,
    pub(crate) config: &'a EngineConfig,
}

impl<'a, R: RouteSource> Resolver<'a, R> {
    pub fn new(source: &'a R, config: &'a EngineConfig) -> Self {
        Self { source, config }
    }

    /// Route both parties to `point` together.
    ///
    /// Fails if either half fails; a route already fetched for the other
    /// half is dropped, though it stays in the cache.
    pub(crate) async fn evaluate(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        point: GeoPoint,
        weight: f64,
        mode: TravelMode,
    ) -> Result<Candidate, OracleError> {
        let (route_a, route_b) = tokio::join!(
            self.source.route(a, point, mode),
            self.source.route(b, point, mode),
        );
        let (route_a, route_b) = both(route_a, route_b)?;
        let candidate = Candidate {
            point,
            weight,
            route_a,
            route_b,
        };
        tracing::debug!(
            weight,
            %point,
            time_a = candidate.time_a(),
            time_b = candidate.time_b(),
            gap = candidate.gap(),
            "evaluated candidate"
        );
        Ok(candidate)
    }

    /// Is this candidate fair enough to stop searching?
    pub(crate) fn is_fair(&self, candidate: &Candidate) -> bool {
        self.config.gap_is_fair(candidate.gap())
            || candidate.relative_gap() < self.config.relative_tolerance
    }
}
