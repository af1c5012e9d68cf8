//! Conversion from Google Maps DTOs to domain types.
//!
//! Handles status mapping, encoded polyline decoding and the construction of
//! the time-annotated polyline the engine interpolates along.

use crate::domain::{
    ConnectorLeg, GeoPoint, Place, RoutePoint, RouteResult, Segment, Stop, TransitLeg, TravelMode,
};

use super::error::OracleError;
use super::types::{
    DirectionsResponse, DirectionsStep, LatLng, NearbySearchResponse, PlaceDto, TransitDetails,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// A coordinate was out of range
    #[error("invalid coordinate: {0}, {1}")]
    InvalidCoordinate(f64, f64),

    /// An encoded polyline was truncated or malformed
    #[error("invalid encoded polyline")]
    InvalidPolyline,

    /// Missing required field
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Step travel mode the engine does not know
    #[error("unknown travel mode: {0}")]
    UnknownMode(String),
}

impl From<ConversionError> for OracleError {
    fn from(err: ConversionError) -> Self {
        OracleError::Json {
            message: err.to_string(),
            body: None,
        }
    }
}

/// Map a Google status string to an error, or `Ok(())` for "OK".
pub fn check_status(status: &str, error_message: Option<&str>) -> Result<(), OracleError> {
    let message = error_message.unwrap_or_default().to_string();
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(OracleError::ZeroResults),
        "REQUEST_DENIED" => Err(OracleError::RequestDenied(message)),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(OracleError::RateLimited),
        other => Err(OracleError::Api {
            status: other.to_string(),
            message,
        }),
    }
}

/// Convert a Directions response into a route.
///
/// Uses the first route. All legs are concatenated; the polyline gets the
/// start and end of every step, stamped with cumulative elapsed time.
pub fn convert_directions(resp: &DirectionsResponse) -> Result<RouteResult, OracleError> {
    check_status(&resp.status, resp.error_message.as_deref())?;

    let route = resp.routes.first().ok_or(OracleError::ZeroResults)?;
    if route.legs.is_empty() {
        return Err(OracleError::ZeroResults);
    }

    let mut polyline = Vec::new();
    let mut segments = Vec::new();
    let mut elapsed: u32 = 0;
    let mut leg_total: u32 = 0;

    for leg in &route.legs {
        leg_total = leg_total.saturating_add(leg.duration.as_ref().map_or(0, |d| secs(d.value)));

        if leg.steps.is_empty() {
            // A leg without steps still has a start and an end.
            polyline.push(RoutePoint::new(point(leg.start_location)?, elapsed));
            elapsed = elapsed.saturating_add(leg.duration.as_ref().map_or(0, |d| secs(d.value)));
            polyline.push(RoutePoint::new(point(leg.end_location)?, elapsed));
            continue;
        }

        for step in &leg.steps {
            let duration = step.duration.as_ref().map_or(0, |d| secs(d.value));
            polyline.push(RoutePoint::new(point(step.start_location)?, elapsed));
            elapsed = elapsed.saturating_add(duration);
            polyline.push(RoutePoint::new(point(step.end_location)?, elapsed));
            segments.push(convert_step(step, duration)?);
        }
    }

    let total_duration_secs = if leg_total > 0 { leg_total } else { elapsed };

    Ok(RouteResult {
        total_duration_secs,
        polyline,
        segments,
    })
}

fn convert_step(step: &DirectionsStep, duration_secs: u32) -> Result<Segment, ConversionError> {
    let path = step_path(step)?;
    let mode: TravelMode = step
        .travel_mode
        .parse()
        .map_err(|_| ConversionError::UnknownMode(step.travel_mode.clone()))?;

    match (&step.transit_details, mode) {
        (Some(details), TravelMode::Transit) => Ok(Segment::Transit(convert_transit(
            details,
            duration_secs,
            path,
        )?)),
        _ => Ok(Segment::Connector(ConnectorLeg {
            mode,
            duration_secs,
            path,
        })),
    }
}

fn convert_transit(
    details: &TransitDetails,
    duration_secs: u32,
    path: Vec<GeoPoint>,
) -> Result<TransitLeg, ConversionError> {
    let line_name = details
        .line
        .as_ref()
        .and_then(|line| {
            line.short_name
                .clone()
                .or_else(|| line.name.clone())
                .or_else(|| line.vehicle.as_ref().and_then(|v| v.name.clone()))
        })
        .unwrap_or_else(|| "transit".to_string());

    Ok(TransitLeg {
        departure_stop: Stop {
            name: details
                .departure_stop
                .name
                .clone()
                .unwrap_or_else(|| "Transit Stop".to_string()),
            location: point(details.departure_stop.location)?,
        },
        arrival_stop: Stop {
            name: details
                .arrival_stop
                .name
                .clone()
                .unwrap_or_else(|| "Transit Stop".to_string()),
            location: point(details.arrival_stop.location)?,
        },
        line_name,
        stop_count: details.num_stops.unwrap_or(0),
        duration_secs,
        path,
    })
}

/// Step geometry: the decoded polyline, or just start and end.
fn step_path(step: &DirectionsStep) -> Result<Vec<GeoPoint>, ConversionError> {
    match &step.polyline {
        Some(encoded) if !encoded.points.is_empty() => decode_polyline(&encoded.points),
        _ => Ok(vec![point(step.start_location)?, point(step.end_location)?]),
    }
}

/// Convert a Nearby Search response into places, in oracle order.
///
/// `ZERO_RESULTS` is not an error here: it just means an empty list.
pub fn convert_places(resp: &NearbySearchResponse) -> Result<Vec<Place>, OracleError> {
    match check_status(&resp.status, resp.error_message.as_deref()) {
        Ok(()) => {}
        Err(OracleError::ZeroResults) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    }

    resp.results
        .iter()
        .map(|dto| convert_place(dto).map_err(OracleError::from))
        .collect()
}

fn convert_place(dto: &PlaceDto) -> Result<Place, ConversionError> {
    Ok(Place {
        id: dto.place_id.clone(),
        name: dto.name.clone().ok_or(ConversionError::MissingField("name"))?,
        vicinity: dto.vicinity.clone().unwrap_or_default(),
        rating: dto.rating.unwrap_or(0.0),
        user_ratings_total: dto.user_ratings_total.unwrap_or(0),
        location: point(dto.geometry.location)?,
        types: dto.types.clone(),
    })
}

fn point(ll: LatLng) -> Result<GeoPoint, ConversionError> {
    GeoPoint::new(ll.lat, ll.lng).map_err(|_| ConversionError::InvalidCoordinate(ll.lat, ll.lng))
}

fn secs(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Decode a Google encoded polyline (precision 1e5).
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, ConversionError> {
    let bytes = encoded.as_bytes();
    let mut idx = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;
    let mut points = Vec::new();

    while idx < bytes.len() {
        lat += next_delta(bytes, &mut idx)?;
        lng += next_delta(bytes, &mut idx)?;
        let (lat_deg, lng_deg) = (lat as f64 / 1e5, lng as f64 / 1e5);
        points.push(
            GeoPoint::new(lat_deg, lng_deg)
                .map_err(|_| ConversionError::InvalidCoordinate(lat_deg, lng_deg))?,
        );
    }

    Ok(points)
}

fn next_delta(bytes: &[u8], idx: &mut usize) -> Result<i64, ConversionError> {
    let mut result: i64 = 0;
    let mut shift = 0;
    loop {
        let byte = *bytes.get(*idx).ok_or(ConversionError::InvalidPolyline)?;
        *idx += 1;
        if !(63..127).contains(&byte) || shift > 30 {
            return Err(ConversionError::InvalidPolyline);
        }
        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        if chunk < 0x20 {
            break;
        }
    }
    Ok(if result & 1 != 0 {
        !(result >> 1)
    } else {
        result >> 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::types::{DirectionsResponse, NearbySearchResponse};

    fn transit_json() -> &'static str {
        r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "duration": { "value": 1500 },
                    "start_location": { "lat": 51.50, "lng": -0.10 },
                    "end_location": { "lat": 51.60, "lng": -0.20 },
                    "steps": [
                        {
                            "travel_mode": "WALKING",
                            "duration": { "value": 300 },
                            "start_location": { "lat": 51.50, "lng": -0.10 },
                            "end_location": { "lat": 51.51, "lng": -0.10 }
                        },
                        {
                            "travel_mode": "TRANSIT",
                            "duration": { "value": 1200 },
                            "start_location": { "lat": 51.51, "lng": -0.10 },
                            "end_location": { "lat": 51.60, "lng": -0.20 },
                            "transit_details": {
                                "departure_stop": { "name": "High St", "location": { "lat": 51.51, "lng": -0.10 } },
                                "arrival_stop": { "name": "Park Rd", "location": { "lat": 51.60, "lng": -0.20 } },
                                "line": { "name": "Circle Line", "short_name": null },
                                "num_stops": 6
                            }
                        }
                    ]
                }]
            }]
        }"#
    }

    #[test]
    fn converts_steps_to_polyline_and_segments() {
        let resp: DirectionsResponse = serde_json::from_str(transit_json()).unwrap();
        let route = convert_directions(&resp).unwrap();

        assert_eq!(route.total_duration_secs, 1500);
        let times: Vec<u32> = route.polyline.iter().map(|p| p.elapsed_secs).collect();
        assert_eq!(times, [0, 300, 300, 1500]);

        assert_eq!(route.segments.len(), 2);
        let legs: Vec<_> = route.transit_legs().collect();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].line_name, "Circle Line");
        assert_eq!(legs[0].stop_count, 6);
        assert_eq!(legs[0].departure_stop.name, "High St");
        // No encoded polyline: path falls back to start and end.
        assert_eq!(legs[0].path.len(), 2);
    }

    #[test]
    fn status_mapping() {
        assert!(check_status("OK", None).is_ok());
        assert!(matches!(
            check_status("ZERO_RESULTS", None),
            Err(OracleError::ZeroResults)
        ));
        assert!(matches!(
            check_status("REQUEST_DENIED", Some("key")),
            Err(OracleError::RequestDenied(m)) if m == "key"
        ));
        assert!(matches!(
            check_status("OVER_QUERY_LIMIT", None),
            Err(OracleError::RateLimited)
        ));
        assert!(matches!(
            check_status("INVALID_REQUEST", None),
            Err(OracleError::Api { .. })
        ));
    }

    #[test]
    fn ok_status_without_routes_is_zero_results() {
        let resp: DirectionsResponse =
            serde_json::from_str(r#"{ "status": "OK", "routes": [] }"#).unwrap();
        assert!(matches!(
            convert_directions(&resp),
            Err(OracleError::ZeroResults)
        ));
    }

    #[test]
    fn decodes_reference_polyline() {
        let points = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@").unwrap();
        assert_eq!(points.len(), 3);
        assert!((points[0].lat() - 38.5).abs() < 1e-9);
        assert!((points[0].lng() + 120.2).abs() < 1e-9);
        assert!((points[1].lat() - 40.7).abs() < 1e-9);
        assert!((points[1].lng() + 120.95).abs() < 1e-9);
        assert!((points[2].lat() - 43.252).abs() < 1e-9);
        assert!((points[2].lng() + 126.453).abs() < 1e-9);
    }

    #[test]
    fn truncated_polyline_is_rejected() {
        assert_eq!(
            decode_polyline("_p~iF~ps|"),
            Err(ConversionError::InvalidPolyline)
        );
    }

    #[test]
    fn places_zero_results_is_empty() {
        let resp: NearbySearchResponse =
            serde_json::from_str(r#"{ "status": "ZERO_RESULTS", "results": [] }"#).unwrap();
        assert!(convert_places(&resp).unwrap().is_empty());
    }

    #[test]
    fn places_default_rating() {
        let resp: NearbySearchResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [{
                    "place_id": "p1",
                    "name": "No Ratings Yet",
                    "geometry": { "location": { "lat": 1.0, "lng": 2.0 } }
                }]
            }"#,
        )
        .unwrap();
        let places = convert_places(&resp).unwrap();
        assert_eq!(places[0].rating, 0.0);
        assert_eq!(places[0].vicinity, "");
    }
}
