//! Results and errors of meeting point resolution.

use std::sync::Arc;

use crate::domain::{GeoPoint, RouteResult, time_gap};
use crate::oracle::{ErrorKind, OracleError};

use super::dispatch::Strategy;

/// Error inside a resolution strategy.
///
/// Never returned to callers of [`resolve_meeting_point`]: the engine turns
/// it into a fallback result.
///
/// [`resolve_meeting_point`]: super::MeetingPointEngine::resolve_meeting_point
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// An oracle query failed
    #[error(transparent)]
    Oracle(#[from] OracleError),

    /// The oracle returned a route the engine cannot interpolate
    #[error("route has no usable geometry")]
    EmptyRoute,

    /// Every candidate point failed to evaluate
    #[error("no candidate point could be evaluated")]
    NoCandidates,

    /// The session's oracle credentials were rejected earlier
    #[error("oracle credentials were rejected for this session")]
    AuthDenied,
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::Oracle(e) => e.kind(),
            ResolveError::AuthDenied => ErrorKind::OracleAuth,
            ResolveError::EmptyRoute | ResolveError::NoCandidates => ErrorKind::EngineInternal,
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind() == ErrorKind::OracleAuth
    }
}

/// A resolved meeting point.
///
/// A route is absent only when that party already stands at the point, or
/// when the result is a fallback.
#[derive(Debug, Clone)]
pub struct MeetingPointResult {
    pub point: GeoPoint,
    pub route_a: Option<Arc<RouteResult>>,
    pub route_b: Option<Arc<RouteResult>>,
    /// True when the strategy could not run as intended.
    pub used_fallback: bool,
    /// Why the fallback was used, when an error caused it.
    pub error_kind: Option<ErrorKind>,
    pub strategy: Strategy,
}

impl MeetingPointResult {
    /// The arithmetic midpoint, with no routes.
    pub fn midpoint_fallback(
        a: GeoPoint,
        b: GeoPoint,
        strategy: Strategy,
        error_kind: ErrorKind,
    ) -> Self {
        Self {
            point: GeoPoint::midpoint(a, b),
            route_a: None,
            route_b: None,
            used_fallback: true,
            error_kind: Some(error_kind),
            strategy,
        }
    }

    /// Party A's travel time; zero when A is already there.
    pub fn time_a(&self) -> Option<u32> {
        travel_time(self.route_a.as_deref(), self.used_fallback)
    }

    /// Party B's travel time; zero when B is already there.
    pub fn time_b(&self) -> Option<u32> {
        travel_time(self.route_b.as_deref(), self.used_fallback)
    }

    /// Gap between the two travel times, when both are known.
    pub fn time_gap_secs(&self) -> Option<u32> {
        Some(time_gap(self.time_a()?, self.time_b()?))
    }
}

fn travel_time(route: Option<&RouteResult>, used_fallback: bool) -> Option<u32> {
    match route {
        Some(r) => Some(r.total_duration_secs),
        None if used_fallback => None,
        None => Some(0),
    }
}

/// What a strategy produced, before the engine stamps the strategy on it.
#[derive(Debug, Clone)]
pub(crate) struct Outcome {
    pub point: GeoPoint,
    pub route_a: Option<Arc<RouteResult>>,
    pub route_b: Option<Arc<RouteResult>>,
    /// Set when the strategy fell back to a simpler plan.
    pub fallback: Option<Fallback>,
}

/// Why a strategy fell back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fallback {
    pub error_kind: Option<ErrorKind>,
}

impl Fallback {
    pub fn because(kind: ErrorKind) -> Self {
        Self {
            error_kind: Some(kind),
        }
    }

    pub fn unexplained() -> Self {
        Self { error_kind: None }
    }
}

impl Outcome {
    pub fn into_result(self, strategy: Strategy) -> MeetingPointResult {
        MeetingPointResult {
            point: self.point,
            route_a: self.route_a,
            route_b: self.route_b,
            used_fallback: self.fallback.is_some(),
            error_kind: self.fallback.and_then(|f| f.error_kind),
            strategy,
        }
    }
}

/// Both parties' routes to a chosen place.
#[derive(Debug, Clone)]
pub struct PlaceRoutes {
    pub route_a: Arc<RouteResult>,
    pub route_b: Arc<RouteResult>,
    pub time_gap_secs: u32,
    /// True when the gap exceeds the balance threshold.
    pub unbalanced: bool,
}
