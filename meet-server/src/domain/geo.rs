//! Geographic point type and planar geometry helpers.
//!
//! All arithmetic here is simple equirectangular interpolation on raw
//! latitude/longitude degrees. That is accurate enough for choosing a
//! meeting point inside a city and keeps candidate generation predictable.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Approximate metres per degree, used for short-range distance estimates.
pub const METERS_PER_DEGREE: f64 = 111_139.0;

/// Error returned when constructing a point with out-of-range coordinates.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidGeoPoint {
    reason: &'static str,
}

/// A latitude/longitude pair in decimal degrees.
///
/// Equality is exact floating-point equality: candidate points are generated
/// programmatically, so two candidates are "the same" only if they were
/// computed identically.
///
/// # Examples
///
/// ```
/// use meet_server::domain::GeoPoint;
///
/// let p = GeoPoint::new(51.5, -0.12).unwrap();
/// assert_eq!(p.lat(), 51.5);
///
/// // Latitude must be within [-90, 90]
/// assert!(GeoPoint::new(91.0, 0.0).is_err());
/// // Longitude must be within [-180, 180]
/// assert!(GeoPoint::new(0.0, 181.0).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = InvalidGeoPoint;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Create a point, validating that both coordinates are finite and in range.
    pub fn new(lat: f64, lng: f64) -> Result<Self, InvalidGeoPoint> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(InvalidGeoPoint {
                reason: "coordinates must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidGeoPoint {
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidGeoPoint {
                reason: "longitude must be within [-180, 180]",
            });
        }
        Ok(Self { lat, lng })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lng(&self) -> f64 {
        self.lng
    }

    /// Arithmetic midpoint of two points.
    ///
    /// This is the fallback meeting point whenever the routing oracle cannot
    /// be used.
    pub fn midpoint(a: GeoPoint, b: GeoPoint) -> GeoPoint {
        GeoPoint {
            lat: (a.lat + b.lat) / 2.0,
            lng: (a.lng + b.lng) / 2.0,
        }
    }

    /// Linear interpolation from `from` towards `to`.
    ///
    /// `fraction` 0 yields `from`, 1 yields `to`. Values outside `[0, 1]` are
    /// clamped so the result always lies on the segment and stays valid.
    ///
    /// ```
    /// use meet_server::domain::GeoPoint;
    ///
    /// let a = GeoPoint::new(10.0, 20.0).unwrap();
    /// let b = GeoPoint::new(12.0, 24.0).unwrap();
    /// let q = GeoPoint::interpolate(a, b, 0.25);
    /// assert_eq!(q, GeoPoint::new(10.5, 21.0).unwrap());
    /// ```
    pub fn interpolate(from: GeoPoint, to: GeoPoint, fraction: f64) -> GeoPoint {
        let f = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        GeoPoint {
            lat: from.lat + f * (to.lat - from.lat),
            lng: from.lng + f * (to.lng - from.lng),
        }
    }

    /// Approximate distance in metres.
    ///
    /// Treats degrees of latitude and longitude as equal length, which is
    /// only good for ranking nearby points against each other.
    pub fn distance_meters(&self, other: &GeoPoint) -> f64 {
        let d_lat = self.lat - other.lat;
        let d_lng = self.lng - other.lng;
        (d_lat * d_lat + d_lng * d_lng).sqrt() * METERS_PER_DEGREE
    }

    /// True if both coordinates differ by less than `tolerance_deg`.
    pub fn is_within(&self, other: &GeoPoint, tolerance_deg: f64) -> bool {
        (self.lat - other.lat).abs() < tolerance_deg && (self.lng - other.lng).abs() < tolerance_deg
    }
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeoPoint({}, {})", self.lat, self.lng)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

/// Absolute gap between two travel times in seconds.
pub fn time_gap(a: u32, b: u32) -> u32 {
    a.abs_diff(b)
}

/// Gap between two travel times relative to the longer one.
///
/// Returns 0.0 when both are zero: nobody travels, which is perfectly fair.
pub fn relative_gap(a: u32, b: u32) -> f64 {
    let max = a.max(b);
    if max == 0 {
        return 0.0;
    }
    f64::from(time_gap(a, b)) / f64::from(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(GeoPoint::new(-90.5, 0.0).is_err());
        assert!(GeoPoint::new(0.0, -180.5).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn accepts_boundaries() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn midpoint_is_arithmetic_mean() {
        let m = GeoPoint::midpoint(p(10.0, 20.0), p(12.0, 30.0));
        assert_eq!(m, p(11.0, 25.0));
    }

    #[test]
    fn interpolate_endpoints() {
        let a = p(1.0, 2.0);
        let b = p(3.0, 6.0);
        assert_eq!(GeoPoint::interpolate(a, b, 0.0), a);
        assert_eq!(GeoPoint::interpolate(a, b, 1.0), b);
        assert_eq!(GeoPoint::interpolate(a, b, 0.5), p(2.0, 4.0));
    }

    #[test]
    fn interpolate_clamps_fraction() {
        let a = p(1.0, 2.0);
        let b = p(3.0, 6.0);
        assert_eq!(GeoPoint::interpolate(a, b, -1.0), a);
        assert_eq!(GeoPoint::interpolate(a, b, 7.0), b);
        assert_eq!(GeoPoint::interpolate(a, b, f64::NAN), a);
    }

    #[test]
    fn distance_one_degree() {
        let d = p(0.0, 0.0).distance_meters(&p(1.0, 0.0));
        assert!((d - METERS_PER_DEGREE).abs() < 1e-6);
    }

    #[test]
    fn within_tolerance() {
        let a = p(10.00001, 20.00001);
        let b = p(10.00002, 20.00002);
        assert!(a.is_within(&b, 0.0001));
        assert!(!a.is_within(&p(10.001, 20.00001), 0.0001));
    }

    #[test]
    fn relative_gap_zero_guard() {
        assert_eq!(relative_gap(0, 0), 0.0);
        assert_eq!(relative_gap(100, 50), 0.5);
        assert_eq!(relative_gap(50, 100), 0.5);
    }

    #[test]
    fn deserialize_validates() {
        let ok: Result<GeoPoint, _> = serde_json::from_str(r#"{"lat": 1.5, "lng": 2.5}"#);
        assert_eq!(ok.unwrap(), p(1.5, 2.5));

        let bad: Result<GeoPoint, _> = serde_json::from_str(r#"{"lat": 100.0, "lng": 2.5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display_five_decimals() {
        assert_eq!(p(51.5, -0.123456).to_string(), "51.50000,-0.12346");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn point() -> impl Strategy<Value = GeoPoint> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lng)| GeoPoint::new(lat, lng).unwrap())
    }

    proptest! {
        /// Interpolated points stay inside the bounding box of the endpoints
        #[test]
        fn interpolation_stays_between(a in point(), b in point(), f in -2.0f64..3.0) {
            let q = GeoPoint::interpolate(a, b, f);
            prop_assert!(q.lat() >= a.lat().min(b.lat()) - 1e-9);
            prop_assert!(q.lat() <= a.lat().max(b.lat()) + 1e-9);
            prop_assert!(q.lng() >= a.lng().min(b.lng()) - 1e-9);
            prop_assert!(q.lng() <= a.lng().max(b.lng()) + 1e-9);
        }

        /// Distance is symmetric
        #[test]
        fn distance_symmetric(a in point(), b in point()) {
            prop_assert!((a.distance_meters(&b) - b.distance_meters(&a)).abs() < 1e-6);
        }

        /// Relative gap is always within [0, 1]
        #[test]
        fn relative_gap_bounded(a in 0u32..100_000, b in 0u32..100_000) {
            let g = relative_gap(a, b);
            prop_assert!((0.0..=1.0).contains(&g));
        }
    }
}
