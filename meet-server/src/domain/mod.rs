//! Domain types for the meeting point engine.
//!
//! Coordinates, travel modes, routes and places. Types that can be invalid
//! (coordinates, parsed names) enforce their invariants at construction, so
//! the engine can trust any value it receives.

mod geo;
mod mode;
mod place;
mod route;

pub use geo::{GeoPoint, InvalidGeoPoint, METERS_PER_DEGREE, relative_gap, time_gap};
pub use mode::{InvalidTravelMode, TravelMode};
pub use place::{InvalidPlaceCategory, Place, PlaceCategory, rank_by_rating};
pub use route::{
    ConnectorLeg, RoutePoint, RouteResult, Segment, Stop, TimeInterpolation, TransitLeg,
};
