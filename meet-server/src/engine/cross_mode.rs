//! Strategies for parties travelling by different modes.

use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{GeoPoint, RouteResult, TravelMode, time_gap};

use super::dispatch::Party;
use super::resolver::{Resolver, RouteSource};
use super::result::{Fallback, Outcome, ResolveError};
use super::stops::{CandidateStop, extract_stops, stop_nearest_time};

/// A candidate stop with the driver's route to it.
#[derive(Debug, Clone)]
struct StopMatch<'s> {
    stop: &'s CandidateStop,
    driving: Arc<RouteResult>,
}

impl StopMatch<'_> {
    fn transit_secs(&self) -> u32 {
        self.stop.time_from_origin
    }

    fn driving_secs(&self) -> u32 {
        self.driving.total_duration_secs
    }
}

/// Bias applied to transit times when the best stop is badly unbalanced.
///
/// `ratio` is driving time over transit time at the best unbiased stop.
pub fn bias_multiplier(ratio: f64) -> Option<f64> {
    if ratio < 0.5 {
        Some(0.7)
    } else if ratio < 0.7 {
        Some(0.8)
    } else if ratio < 0.9 {
        Some(0.9)
    } else {
        None
    }
}

impl<R: RouteSource> Resolver<'_, R> {
    /// Meet where the stationary party stands; the other travels there.
    ///
    /// Used for walkers meeting drivers, and as the fallback of transit stop
    /// matching (with the transit rider staying put).
    pub(crate) async fn stationary_walker(
        &self,
        stay: GeoPoint,
        mover: GeoPoint,
        stayer: Party,
        mover_mode: TravelMode,
    ) -> Result<Outcome, ResolveError> {
        match self.source.route(mover, stay, mover_mode).await {
            Ok(route) => {
                let (route_a, route_b) = stayer.assign(None, Some(route));
                Ok(Outcome {
                    point: stay,
                    route_a,
                    route_b,
                    fallback: None,
                })
            }
            Err(e) if e.is_auth() => Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "no route to stationary party");
                Ok(Outcome {
                    point: stay,
                    route_a: None,
                    route_b: None,
                    fallback: Some(Fallback::because(e.kind())),
                })
            }
        }
    }

    /// Meet at the stop on the transit rider's route that best balances
    /// transit and driving times.
    pub(crate) async fn transit_stop_matching(
        &self,
        rider: GeoPoint,
        driver: GeoPoint,
        rider_party: Party,
    ) -> Result<Outcome, ResolveError> {
        let transit = match self.source.route(rider, driver, TravelMode::Transit).await {
            Ok(route) => route,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::info!(error = %e, "no transit route, rider stays put");
                return self
                    .rider_stays(rider, driver, rider_party, Fallback::because(e.kind()))
                    .await;
            }
        };

        let stops = extract_stops(&transit);
        if stops.is_empty() {
            tracing::info!("transit route has no stops, rider stays put");
            return self
                .rider_stays(rider, driver, rider_party, Fallback::unexplained())
                .await;
        }
        tracing::debug!(stops = stops.len(), "evaluating transit stops");

        let driving = join_all(
            stops
                .iter()
                .map(|stop| self.source.route(driver, stop.location, TravelMode::Driving)),
        )
        .await;

        let mut matches = Vec::with_capacity(stops.len());
        let mut last_kind = None;
        for (stop, result) in stops.iter().zip(driving) {
            match result {
                Ok(route) => matches.push(StopMatch {
                    stop,
                    driving: route,
                }),
                Err(e) if e.is_auth() => return Err(e.into()),
                Err(e) => {
                    tracing::debug!(stop = %stop.name, error = %e, "skipping unreachable stop");
                    last_kind = Some(e.kind());
                }
            }
        }

        let Some(mut best) = self.select_stop(&matches, 1.0) else {
            tracing::info!("no stop reachable by car, rider stays put");
            let fallback = Fallback {
                error_kind: last_kind,
            };
            return self.rider_stays(rider, driver, rider_party, fallback).await;
        };

        let gap = time_gap(best.transit_secs(), best.driving_secs());
        if gap > self.config.bias_gap_secs && stops.len() > self.config.bias_min_stops {
            let ratio = if best.transit_secs() == 0 {
                1.0
            } else {
                f64::from(best.driving_secs()) / f64::from(best.transit_secs())
            };
            if let Some(multiplier) = bias_multiplier(ratio) {
                if let Some(biased) = self.select_stop(&matches, multiplier) {
                    if !std::ptr::eq(biased.stop, best.stop) {
                        tracing::info!(
                            multiplier,
                            ratio,
                            from = %best.stop.name,
                            to = %biased.stop.name,
                            "bias correction changed the chosen stop"
                        );
                    }
                    best = biased;
                }
            }
        }

        tracing::info!(
            stop = %best.stop.name,
            transit = best.transit_secs(),
            driving = best.driving_secs(),
            "selected meeting stop"
        );

        let final_transit = match self
            .source
            .route(rider, best.stop.location, TravelMode::Transit)
            .await
        {
            Ok(route) => route,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "no transit route to chosen stop, rider stays put");
                return self
                    .rider_stays(rider, driver, rider_party, Fallback::because(e.kind()))
                    .await;
            }
        };

        let estimated = time_gap(best.transit_secs(), best.driving_secs());
        let actual = time_gap(final_transit.total_duration_secs, best.driving_secs());
        if estimated.abs_diff(actual) > self.config.estimate_drift_secs {
            tracing::warn!(
                estimated,
                actual,
                "transit time to stop differs from the route estimate"
            );
        }

        let (route_a, route_b) = rider_party.assign(Some(final_transit), Some(best.driving));
        Ok(Outcome {
            point: best.stop.location,
            route_a,
            route_b,
            fallback: None,
        })
    }

    /// Pick the stop with the smallest gap between scaled transit time and
    /// driving time. A stop within the tie window of the incumbent's gap
    /// but with a lower total replaces it.
    fn select_stop<'s>(
        &self,
        matches: &[StopMatch<'s>],
        transit_scale: f64,
    ) -> Option<StopMatch<'s>> {
        let tie_window = f64::from(self.config.tie_window_secs);
        let mut best: Option<(usize, f64, u32)> = None;

        for (i, m) in matches.iter().enumerate() {
            let scaled = f64::from(m.transit_secs()) * transit_scale;
            let gap = (scaled - f64::from(m.driving_secs())).abs();
            let total = m.transit_secs().saturating_add(m.driving_secs());
            let replace = match best {
                None => true,
                Some((_, best_gap, best_total)) => {
                    gap < best_gap || (gap < best_gap + tie_window && total < best_total)
                }
            };
            if replace {
                best = Some((i, gap, total));
            }
        }

        best.map(|(i, _, _)| matches[i].clone())
    }

    /// Transit stop matching fallback: the driver comes to the rider.
    async fn rider_stays(
        &self,
        rider: GeoPoint,
        driver: GeoPoint,
        rider_party: Party,
        fallback: Fallback,
    ) -> Result<Outcome, ResolveError> {
        let mut outcome = self
            .stationary_walker(rider, driver, rider_party, TravelMode::Driving)
            .await?;
        if outcome.fallback.is_none() {
            outcome.fallback = Some(fallback);
        }
        Ok(outcome)
    }

    /// Meet at the walker, unless a long transit trip passes a stop the
    /// walker can reach in reasonable time.
    pub(crate) async fn walker_with_transit_probe(
        &self,
        walker: GeoPoint,
        rider: GeoPoint,
        walker_party: Party,
    ) -> Result<Outcome, ResolveError> {
        let trip = match self.source.route(rider, walker, TravelMode::Transit).await {
            Ok(route) => route,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::info!(error = %e, "no transit route to walker");
                return Ok(Outcome {
                    point: walker,
                    route_a: None,
                    route_b: None,
                    fallback: Some(Fallback::because(e.kind())),
                });
            }
        };

        if let Some(outcome) = self.probe_stop(walker, rider, walker_party, &trip).await? {
            return Ok(outcome);
        }

        let (route_a, route_b) = walker_party.assign(None, Some(trip));
        Ok(Outcome {
            point: walker,
            route_a,
            route_b,
            fallback: None,
        })
    }

    /// Look for a stop around the target share of a long transit trip.
    async fn probe_stop(
        &self,
        walker: GeoPoint,
        rider: GeoPoint,
        walker_party: Party,
        trip: &RouteResult,
    ) -> Result<Option<Outcome>, ResolveError> {
        let trip_secs = trip.total_duration_secs;
        if trip_secs <= self.config.probe_min_trip_secs {
            return Ok(None);
        }

        let stops = extract_stops(trip);
        if stops.len() <= self.config.probe_min_stops {
            return Ok(None);
        }

        let target = f64::from(trip_secs) * self.config.probe_target_fraction;
        let Some(stop) = stop_nearest_time(&stops, target) else {
            return Ok(None);
        };
        tracing::debug!(stop = %stop.name, at = stop.time_from_origin, "probing intermediate stop");

        let walk = match self
            .source
            .route(walker, stop.location, TravelMode::Walking)
            .await
        {
            Ok(route) => route,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::debug!(error = %e, "walker cannot reach probed stop");
                return Ok(None);
            }
        };

        let walk_secs = walk.total_duration_secs;
        if walk_secs >= self.config.probe_max_walk_secs
            || walk_secs.abs_diff(stop.time_from_origin) >= trip_secs
        {
            return Ok(None);
        }

        let ride = match self
            .source
            .route(rider, stop.location, TravelMode::Transit)
            .await
        {
            Ok(route) => route,
            Err(e) if e.is_auth() => return Err(e.into()),
            Err(e) => {
                tracing::debug!(error = %e, "no transit route to probed stop");
                return Ok(None);
            }
        };

        tracing::info!(stop = %stop.name, walk = walk_secs, "meeting at intermediate stop");
        let (route_a, route_b) = walker_party.assign(Some(walk), Some(ride));
        Ok(Some(Outcome {
            point: stop.location,
            route_a,
            route_b,
            fallback: None,
        }))
    }
}
