//! Straight-line oracle for development without API access.
//!
//! Routes follow the straight line between the endpoints at a fixed speed
//! per mode. Transit routes walk to a stop, ride, and walk from a stop.
//! Place search returns a ring of synthetic places around the center.

use crate::domain::{
    ConnectorLeg, GeoPoint, METERS_PER_DEGREE, Place, PlaceCategory, RoutePoint, RouteResult,
    Segment, Stop, TransitLeg, TravelMode,
};

use super::error::OracleError;
use super::{PlaceOracle, RoutingOracle};

/// Walking speed in meters per second.
const WALK_SPEED: f64 = 1.4;
/// Driving speed in meters per second.
const DRIVE_SPEED: f64 = 11.0;
/// In-vehicle transit speed in meters per second.
const TRANSIT_SPEED: f64 = 8.0;
/// Below this distance a transit query just walks.
const MIN_TRANSIT_METERS: f64 = 600.0;
/// Spacing between synthetic transit stops.
const STOP_SPACING_METERS: f64 = 800.0;
/// Polyline resolution for each straight stretch.
const POINTS_PER_STRETCH: usize = 8;
/// Synthetic places per search.
const PLACES_PER_SEARCH: usize = 6;

/// Deterministic oracle that needs no network.
#[derive(Debug, Clone, Default)]
pub struct StraightLineOracle;

impl StraightLineOracle {
    pub fn new() -> Self {
        Self
    }

    /// Build a route synchronously.
    pub fn build_route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> RouteResult {
        let distance = origin.distance_meters(&destination);

        if mode != TravelMode::Transit || distance < MIN_TRANSIT_METERS {
            let speed = if mode == TravelMode::Driving {
                DRIVE_SPEED
            } else {
                WALK_SPEED
            };
            let leg_mode = if mode == TravelMode::Driving {
                TravelMode::Driving
            } else {
                TravelMode::Walking
            };
            let mut builder = RouteBuilder::new(origin);
            builder.stretch(destination, speed);
            let path = builder.path_from(0);
            let duration = builder.elapsed;
            let mut route = builder.finish();
            route.segments.push(Segment::Connector(ConnectorLeg {
                mode: leg_mode,
                duration_secs: duration,
                path,
            }));
            return route;
        }

        // Walk the first and last tenth, ride the rest.
        let board_at = GeoPoint::interpolate(origin, destination, 0.1);
        let alight_at = GeoPoint::interpolate(origin, destination, 0.9);
        let mut builder = RouteBuilder::new(origin);

        builder.stretch(board_at, WALK_SPEED);
        let walk_in = ConnectorLeg {
            mode: TravelMode::Walking,
            duration_secs: builder.elapsed,
            path: builder.path_from(0),
        };

        let ride_start = builder.points.len() - 1;
        let ride_started_at = builder.elapsed;
        builder.stretch(alight_at, TRANSIT_SPEED);
        let ride_meters = board_at.distance_meters(&alight_at);
        let ride = TransitLeg {
            departure_stop: synthetic_stop(board_at),
            arrival_stop: synthetic_stop(alight_at),
            line_name: "Line 1".to_string(),
            stop_count: ((ride_meters / STOP_SPACING_METERS).round() as u32).max(1),
            duration_secs: builder.elapsed - ride_started_at,
            path: builder.path_from(ride_start),
        };

        let walk_start = builder.points.len() - 1;
        let walk_started_at = builder.elapsed;
        builder.stretch(destination, WALK_SPEED);
        let walk_out = ConnectorLeg {
            mode: TravelMode::Walking,
            duration_secs: builder.elapsed - walk_started_at,
            path: builder.path_from(walk_start),
        };

        let mut route = builder.finish();
        route.segments = vec![
            Segment::Connector(walk_in),
            Segment::Transit(ride),
            Segment::Connector(walk_out),
        ];
        route
    }

    /// Build a ring of places around `center`.
    pub fn build_places(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> Vec<Place> {
        let ring_deg = f64::from(radius_m) * 0.5 / METERS_PER_DEGREE;
        (0..PLACES_PER_SEARCH)
            .filter_map(|i| {
                let angle = (i as f64) * std::f64::consts::TAU / PLACES_PER_SEARCH as f64;
                let location = GeoPoint::new(
                    center.lat() + ring_deg * angle.sin(),
                    center.lng() + ring_deg * angle.cos(),
                )
                .ok()?;
                Some(Place {
                    id: format!(
                        "{}-{:.5}-{:.5}-{i}",
                        category.as_str(),
                        center.lat(),
                        center.lng()
                    ),
                    name: format!("{} {}", title_case(category.as_str()), i + 1),
                    vicinity: format!("{location}"),
                    rating: 3.0 + ((i * 7) % 5) as f32 * 0.4,
                    user_ratings_total: 10 * (i as u32 + 1),
                    location,
                    types: vec![category.as_str().to_string()],
                })
            })
            .collect()
    }
}

impl RoutingOracle for StraightLineOracle {
    async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<RouteResult, OracleError> {
        Ok(self.build_route(origin, destination, mode))
    }
}

impl PlaceOracle for StraightLineOracle {
    async fn nearby_search(
        &self,
        center: GeoPoint,
        radius_m: u32,
        category: PlaceCategory,
    ) -> Result<Vec<Place>, OracleError> {
        Ok(self.build_places(center, radius_m, category))
    }
}

/// Accumulates a time-annotated polyline stretch by stretch.
struct RouteBuilder {
    points: Vec<RoutePoint>,
    elapsed: u32,
}

impl RouteBuilder {
    fn new(start: GeoPoint) -> Self {
        Self {
            points: vec![RoutePoint::new(start, 0)],
            elapsed: 0,
        }
    }

    fn current(&self) -> GeoPoint {
        self.points[self.points.len() - 1].point
    }

    fn stretch(&mut self, to: GeoPoint, speed: f64) {
        let from = self.current();
        let started = self.elapsed;
        let secs = (from.distance_meters(&to) / speed).round() as u32;
        for i in 1..=POINTS_PER_STRETCH {
            let f = i as f64 / POINTS_PER_STRETCH as f64;
            let t = started + (f64::from(secs) * f).round() as u32;
            self.points
                .push(RoutePoint::new(GeoPoint::interpolate(from, to, f), t));
        }
        self.elapsed = started + secs;
    }

    fn path_from(&self, index: usize) -> Vec<GeoPoint> {
        self.points[index..].iter().map(|p| p.point).collect()
    }

    fn finish(self) -> RouteResult {
        RouteResult {
            total_duration_secs: self.elapsed,
            polyline: self.points,
            segments: Vec::new(),
        }
    }
}

fn synthetic_stop(at: GeoPoint) -> Stop {
    Stop {
        name: format!("Stop {:.3},{:.3}", at.lat(), at.lng()),
        location: at,
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
