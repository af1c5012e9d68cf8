//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{GeoPoint, Place, RouteResult, TravelMode};
use crate::engine::{MeetingPointResult, PlaceRoutes, Strategy};
use crate::oracle::ErrorKind;

/// Request to resolve a meeting point.
#[derive(Debug, Deserialize)]
pub struct MeetingPointRequest {
    /// Party A's location
    pub a: GeoPoint,

    /// Party B's location
    pub b: GeoPoint,

    /// How A travels ("DRIVING", "TRANSIT" or "WALKING")
    pub mode_a: TravelMode,

    /// How B travels
    pub mode_b: TravelMode,
}

/// A resolved meeting point.
#[derive(Debug, Serialize)]
pub struct MeetingPointResponse<'a> {
    pub point: GeoPoint,

    /// A's route to the point; absent if A stays put or on fallback
    pub route_a: Option<&'a RouteResult>,

    /// B's route to the point
    pub route_b: Option<&'a RouteResult>,

    pub time_a_secs: Option<u32>,
    pub time_b_secs: Option<u32>,
    pub time_gap_secs: Option<u32>,

    /// Whether the strategy fell back to a simpler plan
    pub used_fallback: bool,

    /// Why, if an oracle error caused the fallback
    pub error_kind: Option<ErrorKind>,

    pub strategy: Strategy,

    /// Radius to use when searching for places around the point
    pub search_radius_m: u32,
}

impl<'a> MeetingPointResponse<'a> {
    pub fn new(result: &'a MeetingPointResult, search_radius_m: u32) -> Self {
        Self {
            point: result.point,
            route_a: result.route_a.as_deref(),
            route_b: result.route_b.as_deref(),
            time_a_secs: result.time_a(),
            time_b_secs: result.time_b(),
            time_gap_secs: result.time_gap_secs(),
            used_fallback: result.used_fallback,
            error_kind: result.error_kind,
            strategy: result.strategy,
            search_radius_m,
        }
    }
}

/// Query for places around a point.
///
/// Modes are kept as strings so that bad values produce a readable error.
#[derive(Debug, Deserialize)]
pub struct PlacesQuery {
    pub lat: f64,
    pub lng: f64,

    /// "cafe", "restaurant" or "bar"
    pub category: String,

    /// Search radius in meters; derived from the modes if absent
    pub radius: Option<u32>,

    pub mode_a: Option<String>,
    pub mode_b: Option<String>,
}

/// Places found around a point, best-rated first.
#[derive(Debug, Serialize)]
pub struct PlacesResponse {
    pub places: Vec<Place>,
    pub radius_m: u32,
}

/// Request to route both parties to a chosen place.
#[derive(Debug, Deserialize)]
pub struct PlaceRoutesRequest {
    pub a: GeoPoint,
    pub b: GeoPoint,
    pub mode_a: TravelMode,
    pub mode_b: TravelMode,
    pub place_location: GeoPoint,
}

/// Both parties' routes to a place.
#[derive(Debug, Serialize)]
pub struct PlaceRoutesResponse<'a> {
    pub route_a: &'a RouteResult,
    pub route_b: &'a RouteResult,
    pub time_gap_secs: u32,

    /// True when one party travels much longer than the other
    pub unbalanced: bool,
}

impl<'a> From<&'a PlaceRoutes> for PlaceRoutesResponse<'a> {
    fn from(routes: &'a PlaceRoutes) -> Self {
        Self {
            route_a: &routes.route_a,
            route_b: &routes.route_b,
            time_gap_secs: routes.time_gap_secs,
            unbalanced: routes.unbalanced,
        }
    }
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
