//! Place search radius and routes to a chosen place.

use crate::domain::{GeoPoint, TravelMode, time_gap};

use super::resolver::{Resolver, RouteSource, both};
use super::result::{PlaceRoutes, ResolveError};

/// Search radius in meters around the meeting point for a pair of modes.
///
/// Drivers can reach places further out, so the radius grows with the
/// number of drivers.
pub fn search_radius(mode_a: TravelMode, mode_b: TravelMode) -> u32 {
    use TravelMode::Driving;

    match (mode_a, mode_b) {
        (Driving, Driving) => 2000,
        (Driving, _) | (_, Driving) => 1500,
        _ => 500,
    }
}

impl<R: RouteSource> Resolver<'_, R> {
    /// Route both parties to `place`, each with their own mode.
    pub(crate) async fn routes_to_place(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode_a: TravelMode,
        mode_b: TravelMode,
        place: GeoPoint,
    ) -> Result<PlaceRoutes, ResolveError> {
        let (route_a, route_b) = tokio::join!(
            self.source.route(a, place, mode_a),
            self.source.route(b, place, mode_b),
        );
        let (route_a, route_b) = both(route_a, route_b)?;

        let gap = time_gap(route_a.total_duration_secs, route_b.total_duration_secs);
        let unbalanced = gap > self.config.unbalanced_gap_secs;
        if unbalanced {
            tracing::info!(
                time_a = route_a.total_duration_secs,
                time_b = route_b.total_duration_secs,
                "routes to place are unbalanced"
            );
        }

        Ok(PlaceRoutes {
            route_a,
            route_b,
            time_gap_secs: gap,
            unbalanced,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TravelMode::{Driving, Transit, Walking};

    #[test]
    fn radius_table() {
        assert_eq!(search_radius(Walking, Driving), 1500);
        assert_eq!(search_radius(Driving, Walking), 1500);
        assert_eq!(search_radius(Transit, Driving), 1500);
        assert_eq!(search_radius(Driving, Driving), 2000);
        assert_eq!(search_radius(Transit, Transit), 500);
        assert_eq!(search_radius(Walking, Transit), 500);
        assert_eq!(search_radius(Walking, Walking), 500);
    }
}
