//! Candidate meeting stops along a transit route.
//!
//! Every transit leg contributes its departure and arrival stop. Long rides
//! also contribute a few virtual stops spread along the leg's path, and long
//! walks between legs contribute one candidate halfway along. Candidates are
//! timestamped with the seconds the transit rider needs to reach them.

use serde::Serialize;

use crate::domain::{GeoPoint, RouteResult, Segment};

/// Legs with more stops than this get virtual stops.
const VIRTUAL_MIN_STOP_COUNT: u32 = 3;
/// ...if their path has more points than this.
const VIRTUAL_MIN_PATH_POINTS: usize = 10;
/// At most this many virtual stops per leg.
const MAX_VIRTUAL_STOPS: usize = 4;
/// Walks longer than this get a midpoint candidate.
const LONG_WALK_SECS: u32 = 600;
/// Candidates closer than this in both axes are duplicates (about 11 m).
const DEDUP_TOLERANCE_DEG: f64 = 0.0001;

/// Where a candidate stop came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopKind {
    Departure,
    Arrival,
    /// Interpolated along a ride, not a real stop.
    Virtual,
    /// Halfway along a long walk between legs.
    WalkingConnection,
}

/// A place the transit rider passes, usable as a meeting point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateStop {
    pub location: GeoPoint,
    pub name: String,
    /// Seconds from the start of the route.
    pub time_from_origin: u32,
    pub kind: StopKind,
}

/// Extract candidate stops from a route, ordered by time.
///
/// A route without any transit legs yields no candidates.
pub fn extract_stops(route: &RouteResult) -> Vec<CandidateStop> {
    if route.transit_legs().next().is_none() {
        return Vec::new();
    }

    let mut stops = Vec::new();
    let mut clock: u32 = 0;

    for segment in &route.segments {
        let start = clock;
        let duration = segment.duration_secs();
        let end = start.saturating_add(duration);

        match segment {
            Segment::Transit(leg) => {
                stops.push(CandidateStop {
                    location: leg.departure_stop.location,
                    name: leg.departure_stop.name.clone(),
                    time_from_origin: start,
                    kind: StopKind::Departure,
                });

                let len = leg.path.len();
                if leg.stop_count > VIRTUAL_MIN_STOP_COUNT && len > VIRTUAL_MIN_PATH_POINTS {
                    let n = MAX_VIRTUAL_STOPS.min(len / 4);
                    for i in 1..=n {
                        let offset = (u64::from(duration) * i as u64 / (n as u64 + 1)) as u32;
                        stops.push(CandidateStop {
                            location: leg.path[i * len / (n + 1)],
                            name: format!("{} (along the line)", leg.line_name),
                            time_from_origin: start + offset,
                            kind: StopKind::Virtual,
                        });
                    }
                }

                stops.push(CandidateStop {
                    location: leg.arrival_stop.location,
                    name: leg.arrival_stop.name.clone(),
                    time_from_origin: end,
                    kind: StopKind::Arrival,
                });
            }
            Segment::Connector(leg) => {
                if duration > LONG_WALK_SECS && !leg.path.is_empty() {
                    stops.push(CandidateStop {
                        location: leg.path[leg.path.len() / 2],
                        name: "Walking connection".to_string(),
                        time_from_origin: end - duration / 2,
                        kind: StopKind::WalkingConnection,
                    });
                }
            }
        }

        clock = end;
    }

    let mut unique: Vec<CandidateStop> = Vec::with_capacity(stops.len());
    for stop in stops {
        if !unique
            .iter()
            .any(|kept| kept.location.is_within(&stop.location, DEDUP_TOLERANCE_DEG))
        {
            unique.push(stop);
        }
    }

    unique.sort_by_key(|s| s.time_from_origin);
    unique
}

/// The stop whose time is closest to `target_secs`. Earlier stops win ties.
pub fn stop_nearest_time(stops: &[CandidateStop], target_secs: f64) -> Option<&CandidateStop> {
    stops.iter().min_by(|x, y| {
        let dx = (f64::from(x.time_from_origin) - target_secs).abs();
        let dy = (f64::from(y.time_from_origin) - target_secs).abs();
        dx.total_cmp(&dy)
    })
}

/// The stop closest to `point`, if any lies within `max_meters`.
pub fn stop_near_point(
    stops: &[CandidateStop],
    point: GeoPoint,
    max_meters: f64,
) -> Option<&CandidateStop> {
    stops
        .iter()
        .map(|s| (s, s.location.distance_meters(&point)))
        .filter(|(_, d)| *d <= max_meters)
        .min_by(|(_, d1), (_, d2)| d1.total_cmp(d2))
        .map(|(s, _)| s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectorLeg, RoutePoint, Stop, TransitLeg, TravelMode};

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn stop(name: &str, at: GeoPoint) -> Stop {
        Stop {
            name: name.to_string(),
            location: at,
        }
    }

    fn ride(from: GeoPoint, to: GeoPoint, stop_count: u32, secs: u32, path_len: usize) -> Segment {
        let path = (0..path_len)
            .map(|i| GeoPoint::interpolate(from, to, i as f64 / (path_len.max(2) - 1) as f64))
            .collect();
        Segment::Transit(TransitLeg {
            departure_stop: stop("From", from),
            arrival_stop: stop("To", to),
            line_name: "42".to_string(),
            stop_count,
            duration_secs: secs,
            path,
        })
    }

    fn walk(from: GeoPoint, to: GeoPoint, secs: u32) -> Segment {
        Segment::Connector(ConnectorLeg {
            mode: TravelMode::Walking,
            duration_secs: secs,
            path: vec![from, GeoPoint::midpoint(from, to), to],
        })
    }

    fn route(segments: Vec<Segment>) -> RouteResult {
        let total = segments.iter().map(Segment::duration_secs).sum();
        RouteResult {
            total_duration_secs: total,
            polyline: vec![RoutePoint::new(p(0.0, 0.0), 0)],
            segments,
        }
    }

    #[test]
    fn no_transit_legs_means_no_stops() {
        let r = route(vec![walk(p(1.0, 1.0), p(1.1, 1.1), 3600)]);
        assert!(extract_stops(&r).is_empty());
        assert!(extract_stops(&RouteResult::stationary(p(1.0, 1.0))).is_empty());
    }

    #[test]
    fn departure_and_arrival_with_cumulative_time() {
        let r = route(vec![
            walk(p(1.0, 1.0), p(1.01, 1.0), 300),
            ride(p(1.01, 1.0), p(1.2, 1.0), 2, 900, 2),
        ]);
        let stops = extract_stops(&r);
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].kind, StopKind::Departure);
        assert_eq!(stops[0].time_from_origin, 300);
        assert_eq!(stops[1].kind, StopKind::Arrival);
        assert_eq!(stops[1].time_from_origin, 1200);
    }

    #[test]
    fn long_rides_get_virtual_stops() {
        // 20 path points -> min(4, 20 / 4) = 4 virtual stops at 1/5 steps.
        let r = route(vec![ride(p(1.0, 1.0), p(1.5, 1.0), 8, 1000, 20)]);
        let stops = extract_stops(&r);
        let virtual_times: Vec<u32> = stops
            .iter()
            .filter(|s| s.kind == StopKind::Virtual)
            .map(|s| s.time_from_origin)
            .collect();
        assert_eq!(virtual_times, [200, 400, 600, 800]);
        assert_eq!(stops.len(), 6);
        assert!(
            stops
                .windows(2)
                .all(|w| w[0].time_from_origin <= w[1].time_from_origin)
        );
    }

    #[test]
    fn short_paths_get_no_virtual_stops() {
        let r = route(vec![ride(p(1.0, 1.0), p(1.5, 1.0), 8, 1000, 10)]);
        assert_eq!(extract_stops(&r).len(), 2);

        let r = route(vec![ride(p(1.0, 1.0), p(1.5, 1.0), 3, 1000, 40)]);
        assert_eq!(extract_stops(&r).len(), 2);
    }

    #[test]
    fn long_walk_gets_a_connection_candidate() {
        let r = route(vec![
            ride(p(1.0, 1.0), p(1.2, 1.0), 2, 600, 2),
            walk(p(1.2, 1.0), p(1.3, 1.0), 800),
            ride(p(1.3, 1.0), p(1.5, 1.0), 2, 600, 2),
        ]);
        let stops = extract_stops(&r);
        let connection = stops
            .iter()
            .find(|s| s.kind == StopKind::WalkingConnection)
            .unwrap();
        assert_eq!(connection.time_from_origin, 1000);
        assert_eq!(connection.location, GeoPoint::midpoint(p(1.2, 1.0), p(1.3, 1.0)));
    }

    #[test]
    fn nearby_stops_are_deduplicated() {
        let r = route(vec![
            ride(p(10.0, 20.0), p(10.00001, 20.00001), 1, 100, 2),
            ride(p(10.00002, 20.00002), p(10.5, 20.5), 1, 100, 2),
        ]);
        let stops = extract_stops(&r);
        // First leg's departure, its arrival and the second departure collapse.
        assert_eq!(stops.len(), 2);
        assert_eq!(stops[0].location, p(10.0, 20.0));
        assert_eq!(stops[0].kind, StopKind::Departure);
    }

    #[test]
    fn dedup_of_specific_pair() {
        let r = route(vec![
            ride(p(5.0, 5.0), p(10.00001, 20.00001), 1, 100, 2),
            ride(p(10.00002, 20.00002), p(5.0, 5.0), 1, 100, 2),
        ]);
        let stops = extract_stops(&r);
        let near: Vec<_> = stops
            .iter()
            .filter(|s| s.location.is_within(&p(10.0, 20.0), 0.001))
            .collect();
        assert_eq!(near.len(), 1);
        assert_eq!(near[0].location, p(10.00001, 20.00001));
    }

    #[test]
    fn nearest_time_and_point() {
        let r = route(vec![ride(p(1.0, 1.0), p(1.5, 1.0), 8, 1000, 20)]);
        let stops = extract_stops(&r);

        let s = stop_nearest_time(&stops, 610.0).unwrap();
        assert_eq!(s.time_from_origin, 600);

        assert!(stop_near_point(&stops, p(1.0001, 1.0), 1000.0).is_some());
        assert!(stop_near_point(&stops, p(2.0, 2.0), 1000.0).is_none());
    }
}
