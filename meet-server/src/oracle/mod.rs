//! Routing and place-search oracles.
//!
//! The engine only sees the two traits defined here. Concrete oracles:
//!
//! - [`GoogleMapsClient`] talks to the Google Maps Directions and Places
//!   Nearby Search web services
//! - [`StraightLineOracle`] fakes both without a network, for development
//!
//! Oracle failures are reported as [`OracleError`]; [`ErrorKind`] is the
//! classification the engine uses to choose a fallback.

mod client;
mod convert;
mod error;
mod mock;
mod types;

use std::future::Future;

use crate::domain::{GeoPoint, Place, PlaceCategory, RouteResult, TravelMode};

pub use client::{GoogleMapsClient, GoogleMapsConfig};
pub use convert::{
    ConversionError, check_status, convert_directions, convert_places, decode_polyline,
};
pub use error::{ErrorKind, OracleError};
pub use mock::StraightLineOracle;
pub use types::{DirectionsResponse, NearbySearchResponse};

/// Something that can route between two points.
pub trait RoutingOracle: Send + Sync + 'static {
    /// Route from `origin` to `destination` using `mode`.
    fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> impl Future<Output = Result<RouteResult, OracleError>> + Send;
}

/// Something that can list places around a point.
pub trait PlaceOracle: Send + Sync + 'static {
    /// Places of `category` within `radius_m` meters of `center`, in the
    /// oracle's relevance order.
    fn nearby_search(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> impl Future<Output = Result<Vec<Place>, OracleError>> + Send;
}
