//! Google Maps web service response DTOs.
//!
//! These map directly to the Directions and Places Nearby Search JSON
//! responses. Fields the engine does not use are left out; fields the
//! service sometimes omits are `Option`.

use serde::Deserialize;

/// Response from the Directions API.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// "OK", "ZERO_RESULTS", "REQUEST_DENIED", ...
    pub status: String,

    pub error_message: Option<String>,

    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

/// One route alternative. The engine only ever requests one.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

/// A leg between two waypoints. Without waypoints there is exactly one.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsLeg {
    pub duration: Option<TextValue>,
    pub start_location: LatLng,
    pub end_location: LatLng,
    #[serde(default)]
    pub steps: Vec<DirectionsStep>,
}

/// A single instruction within a leg.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsStep {
    /// "DRIVING", "WALKING", "TRANSIT", ...
    pub travel_mode: String,
    pub duration: Option<TextValue>,
    pub start_location: LatLng,
    pub end_location: LatLng,
    pub polyline: Option<EncodedPolyline>,
    pub transit_details: Option<TransitDetails>,
}

/// A `{ "text": "5 mins", "value": 300 }` pair.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub value: u64,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

/// Transit information for a TRANSIT step.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitDetails {
    pub departure_stop: TransitStopDto,
    pub arrival_stop: TransitStopDto,
    pub line: Option<TransitLine>,
    pub num_stops: Option<u32>,
    pub headsign: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitStopDto {
    pub name: Option<String>,
    pub location: LatLng,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitLine {
    pub name: Option<String>,
    pub short_name: Option<String>,
    pub vehicle: Option<TransitVehicle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitVehicle {
    pub name: Option<String>,
}

/// Response from the Places Nearby Search API.
#[derive(Debug, Clone, Deserialize)]
pub struct NearbySearchResponse {
    pub status: String,

    pub error_message: Option<String>,

    #[serde(default)]
    pub results: Vec<PlaceDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceDto {
    pub place_id: String,
    pub name: Option<String>,
    pub vicinity: Option<String>,
    pub rating: Option<f32>,
    pub user_ratings_total: Option<u32>,
    pub geometry: PlaceGeometry,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceGeometry {
    pub location: LatLng,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_directions() {
        let json = r#"{
            "status": "OK",
            "routes": [{
                "legs": [{
                    "duration": { "text": "10 mins", "value": 600 },
                    "start_location": { "lat": 51.5, "lng": -0.1 },
                    "end_location": { "lat": 51.6, "lng": -0.2 },
                    "steps": []
                }]
            }]
        }"#;
        let resp: DirectionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "OK");
        assert_eq!(resp.routes[0].legs[0].duration.as_ref().unwrap().value, 600);
    }

    #[test]
    fn parse_error_status_without_routes() {
        let json = r#"{ "status": "REQUEST_DENIED", "error_message": "bad key" }"#;
        let resp: DirectionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "REQUEST_DENIED");
        assert!(resp.routes.is_empty());
        assert_eq!(resp.error_message.as_deref(), Some("bad key"));
    }

    #[test]
    fn parse_place() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "place_id": "abc",
                "name": "Corner Cafe",
                "vicinity": "1 Main St",
                "rating": 4.4,
                "user_ratings_total": 120,
                "geometry": { "location": { "lat": 1.0, "lng": 2.0 } },
                "types": ["cafe", "food"]
            }]
        }"#;
        let resp: NearbySearchResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.results.len(), 1);
        assert_eq!(resp.results[0].types, ["cafe", "food"]);
    }
}
