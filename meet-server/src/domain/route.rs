//! Routes returned by the routing oracle.
//!
//! A route is a total duration, a polyline annotated with elapsed time, and
//! the ordered segments the oracle reported. Transit routes carry
//! [`TransitLeg`]s that the stop extractor turns into meeting candidates.

use serde::Serialize;

use super::{GeoPoint, TravelMode};

/// A point on a route together with the seconds elapsed since departure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoutePoint {
    pub point: GeoPoint,
    pub elapsed_secs: u32,
}

impl RoutePoint {
    pub fn new(point: GeoPoint, elapsed_secs: u32) -> Self {
        Self {
            point,
            elapsed_secs,
        }
    }
}

/// A named transit stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub name: String,
    pub location: GeoPoint,
}

/// A ride on one transit line between two stops.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitLeg {
    pub departure_stop: Stop,
    pub arrival_stop: Stop,
    /// Short name of the line if the oracle has one, else its long name.
    pub line_name: String,
    /// Number of stops the vehicle makes on this leg.
    pub stop_count: u32,
    pub duration_secs: u32,
    /// Geometry of the ride, in travel order.
    pub path: Vec<GeoPoint>,
}

/// A non-transit step: walking to or between stops, or driving.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectorLeg {
    pub mode: TravelMode,
    pub duration_secs: u32,
    pub path: Vec<GeoPoint>,
}

/// A segment of a route: either riding transit or getting around on foot/by car.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    Transit(TransitLeg),
    Connector(ConnectorLeg),
}

impl Segment {
    /// Duration of this segment in seconds.
    pub fn duration_secs(&self) -> u32 {
        match self {
            Segment::Transit(leg) => leg.duration_secs,
            Segment::Connector(leg) => leg.duration_secs,
        }
    }
}

/// Result of interpolating a route at a given elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterpolation {
    /// The interpolated position.
    pub point: GeoPoint,
    /// Last polyline point at or before the target time.
    pub before: RoutePoint,
    /// First polyline point at or after the target time.
    pub after: RoutePoint,
    /// Position between `before` and `after`, by time.
    pub fraction: f64,
}

/// A route from the routing oracle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub total_duration_secs: u32,
    pub polyline: Vec<RoutePoint>,
    pub segments: Vec<Segment>,
}

impl RouteResult {
    /// A zero-length route for a party who is already at the meeting point.
    pub fn stationary(at: GeoPoint) -> Self {
        Self {
            total_duration_secs: 0,
            polyline: vec![RoutePoint::new(at, 0)],
            segments: Vec::new(),
        }
    }

    /// Transit legs in travel order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitLeg> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Transit(leg) => Some(leg),
            Segment::Connector(_) => None,
        })
    }

    /// Find the position reached after `elapsed_secs` seconds.
    ///
    /// Scans for the first consecutive pair of polyline points whose elapsed
    /// times bracket the target and interpolates linearly between them by
    /// time. A pair with equal times yields a fraction of 0. Returns `None`
    /// when the polyline has fewer than two points or never reaches the
    /// target.
    pub fn interpolate_at(&self, elapsed_secs: f64) -> Option<TimeInterpolation> {
        self.polyline.windows(2).find_map(|pair| {
            let (before, after) = (pair[0], pair[1]);
            let t0 = f64::from(before.elapsed_secs);
            let t1 = f64::from(after.elapsed_secs);
            if t0 <= elapsed_secs && elapsed_secs <= t1 {
                let span = t1 - t0;
                let fraction = if span == 0.0 {
                    0.0
                } else {
                    (elapsed_secs - t0) / span
                };
                Some(TimeInterpolation {
                    point: GeoPoint::interpolate(before.point, after.point, fraction),
                    before,
                    after,
                    fraction,
                })
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn route(points: &[(f64, f64, u32)]) -> RouteResult {
        RouteResult {
            total_duration_secs: points.last().map(|p| p.2).unwrap_or(0),
            polyline: points
                .iter()
                .map(|(lat, lng, t)| RoutePoint::new(p(*lat, *lng), *t))
                .collect(),
            segments: Vec::new(),
        }
    }

    #[test]
    fn interpolate_in_middle_of_segment() {
        let r = route(&[(0.0, 0.0, 0), (0.0, 1.0, 400), (0.0, 2.0, 800), (0.0, 3.0, 1000)]);
        let hit = r.interpolate_at(500.0).unwrap();
        assert_eq!(hit.before.elapsed_secs, 400);
        assert_eq!(hit.after.elapsed_secs, 800);
        assert!((hit.fraction - 0.25).abs() < 1e-12);
        assert!((hit.point.lng() - 1.25).abs() < 1e-12);
    }

    #[test]
    fn interpolate_on_exact_vertex_uses_first_bracket() {
        let r = route(&[(0.0, 0.0, 0), (0.0, 1.0, 500), (0.0, 2.0, 1000)]);
        let hit = r.interpolate_at(500.0).unwrap();
        assert_eq!(hit.before.elapsed_secs, 0);
        assert_eq!(hit.after.elapsed_secs, 500);
        assert_eq!(hit.fraction, 1.0);
        assert_eq!(hit.point, p(0.0, 1.0));
    }

    #[test]
    fn zero_length_pair_has_zero_fraction() {
        let r = route(&[(0.0, 0.0, 0), (1.0, 1.0, 0)]);
        let hit = r.interpolate_at(0.0).unwrap();
        assert_eq!(hit.fraction, 0.0);
        assert_eq!(hit.point, p(0.0, 0.0));
    }

    #[test]
    fn empty_or_single_point_polyline() {
        assert!(route(&[]).interpolate_at(0.0).is_none());
        assert!(route(&[(0.0, 0.0, 0)]).interpolate_at(0.0).is_none());
    }

    #[test]
    fn target_beyond_route() {
        let r = route(&[(0.0, 0.0, 0), (0.0, 1.0, 100)]);
        assert!(r.interpolate_at(150.0).is_none());
    }

    #[test]
    fn stationary_route() {
        let r = RouteResult::stationary(p(5.0, 6.0));
        assert_eq!(r.total_duration_secs, 0);
        assert_eq!(r.polyline, [RoutePoint::new(p(5.0, 6.0), 0)]);
        assert_eq!(r.transit_legs().count(), 0);
    }

    #[test]
    fn transit_legs_filters_connectors() {
        let stop = |name: &str| Stop {
            name: name.to_string(),
            location: p(0.0, 0.0),
        };
        let r = RouteResult {
            total_duration_secs: 900,
            polyline: Vec::new(),
            segments: vec![
                Segment::Connector(ConnectorLeg {
                    mode: TravelMode::Walking,
                    duration_secs: 300,
                    path: Vec::new(),
                }),
                Segment::Transit(TransitLeg {
                    departure_stop: stop("A"),
                    arrival_stop: stop("B"),
                    line_name: "42".to_string(),
                    stop_count: 2,
                    duration_secs: 600,
                    path: Vec::new(),
                }),
            ],
        };
        let legs: Vec<_> = r.transit_legs().collect();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].line_name, "42");
        assert_eq!(r.segments[0].duration_secs(), 300);
    }
}
