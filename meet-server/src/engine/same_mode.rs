//! Meeting point search for two parties using the same travel mode.
//!
//! First try the point halfway along the direct route, by time. If that
//! point is not fair enough, evaluate weighted points on the straight line
//! between the parties one at a time, then narrow in with a bounded
//! step-halving search.

use std::sync::Arc;

use crate::domain::{GeoPoint, RouteResult, TravelMode};
use crate::oracle::OracleError;

use super::resolver::{Candidate, Resolver, RouteSource, keep_better};
use super::result::{Outcome, ResolveError};
use super::stops::{extract_stops, stop_near_point};

/// Outcome of evaluating one weight during refinement.
enum Step {
    /// Keep going.
    Continue,
    /// The best candidate is fair; stop searching.
    Done,
}

impl<R: RouteSource> Resolver<'_, R> {
    /// Resolve a meeting point for two parties travelling by `mode`.
    pub(crate) async fn same_mode(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode: TravelMode,
    ) -> Result<Outcome, ResolveError> {
        if a == b {
            return Ok(Outcome {
                point: a,
                route_a: Some(Arc::new(RouteResult::stationary(a))),
                route_b: Some(Arc::new(RouteResult::stationary(a))),
                fallback: None,
            });
        }

        let incumbent = match self.direct_candidate(a, b, mode).await {
            Ok(candidate) if self.is_fair(&candidate) => {
                tracing::debug!(gap = candidate.gap(), "direct route midpoint is fair");
                return Ok(candidate.into());
            }
            Ok(candidate) => Some(candidate),
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                tracing::info!(error = %e, "direct route interpolation failed, refining");
                None
            }
        };

        let best = self.refine(a, b, mode, incumbent).await?;
        Ok(best.into())
    }

    /// The point reached halfway through the direct route, by time.
    ///
    /// Transit midpoints snap to a nearby stop, since nobody can meet in the
    /// middle of a ride.
    pub(crate) async fn direct_candidate(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode: TravelMode,
    ) -> Result<Candidate, ResolveError> {
        let direct = self.source.route(a, b, mode).await?;
        let half = f64::from(direct.total_duration_secs) / 2.0;
        let hit = direct.interpolate_at(half).ok_or(ResolveError::EmptyRoute)?;

        tracing::debug!(
            total = direct.total_duration_secs,
            before = hit.before.elapsed_secs,
            after = hit.after.elapsed_secs,
            fraction = hit.fraction,
            "interpolated direct route"
        );

        let mut point = hit.point;
        if mode == TravelMode::Transit {
            let stops = extract_stops(&direct);
            if let Some(stop) = stop_near_point(&stops, point, self.config.stop_snap_meters) {
                tracing::debug!(stop = %stop.name, "snapped transit midpoint to stop");
                point = stop.location;
            }
        }

        Ok(self.evaluate(a, b, point, 0.5, mode).await?)
    }

    /// Search weighted points between `a` and `b` for the fairest one.
    async fn refine(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode: TravelMode,
        incumbent: Option<Candidate>,
    ) -> Result<Candidate, ResolveError> {
        let mut best = incumbent;
        let mut last_error: Option<OracleError> = None;

        for &weight in &self.config.refine_weights {
            if let Step::Done = self
                .try_weight(a, b, mode, weight, &mut best, &mut last_error)
                .await?
            {
                return finish(best, last_error);
            }
        }

        // One party much slower everywhere: look closer to them.
        let extension = best.as_ref().and_then(|c| self.extension_weights(c));
        for weight in extension.unwrap_or_default() {
            if let Step::Done = self
                .try_weight(a, b, mode, weight, &mut best, &mut last_error)
                .await?
            {
                return finish(best, last_error);
            }
        }

        self.binary_search(a, b, mode, &mut best, &mut last_error).await?;
        finish(best, last_error)
    }

    /// Weights near the slower party, if one party dominates.
    fn extension_weights(&self, current: &Candidate) -> Option<Vec<f64>> {
        let (short, long) = if current.time_a() < current.time_b() {
            (current.time_a(), current.time_b())
        } else {
            (current.time_b(), current.time_a())
        };
        if long == 0 || f64::from(short) / f64::from(long) >= self.config.dominance_ratio {
            return None;
        }

        let weights = if current.time_a() > current.time_b() {
            self.config.extend_toward_a.clone()
        } else {
            self.config.extend_toward_b.clone()
        };
        tracing::debug!(?weights, "one party dominates, extending search");
        Some(weights)
    }

    /// Step-halving search from the best weight so far.
    ///
    /// Each round moves toward the party with the longer travel time, which
    /// shortens their trip. Runs at most `max_search_rounds` rounds.
    async fn binary_search(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode: TravelMode,
        best: &mut Option<Candidate>,
        last_error: &mut Option<OracleError>,
    ) -> Result<(), ResolveError> {
        let mut step = self.config.initial_step;

        for round in 0..self.config.max_search_rounds {
            let Some(current) = best.as_ref() else {
                return Ok(());
            };
            if self.config.gap_is_fair(current.gap()) {
                return Ok(());
            }

            let toward_a = current.time_a() > current.time_b();
            let weight = if toward_a {
                self.config.clamp_weight(current.weight - step)
            } else {
                self.config.clamp_weight(current.weight + step)
            };
            step /= 2.0;

            if weight == current.weight {
                tracing::debug!(round, weight, "search weight pinned at bound");
                continue;
            }

            tracing::debug!(round, weight, toward_a, "binary search round");
            self.try_weight(a, b, mode, weight, best, last_error).await?;
        }

        Ok(())
    }

    /// Evaluate one weight and fold it into `best`.
    async fn try_weight(
        &self,
        a: GeoPoint,
        b: GeoPoint,
        mode: TravelMode,
        weight: f64,
        best: &mut Option<Candidate>,
        last_error: &mut Option<OracleError>,
    ) -> Result<Step, ResolveError> {
        let point = GeoPoint::interpolate(a, b, weight);
        match self.evaluate(a, b, point, weight, mode).await {
            Ok(candidate) => {
                keep_better(best, candidate);
                let fair = best
                    .as_ref()
                    .is_some_and(|c| c.relative_gap() < self.config.relative_tolerance);
                Ok(if fair { Step::Done } else { Step::Continue })
            }
            Err(e) if e.is_auth() => Err(e.into()),
            Err(e) => {
                tracing::info!(weight, error = %e, "skipping candidate");
                *last_error = Some(e);
                Ok(Step::Continue)
            }
        }
    }
}

fn finish(
    best: Option<Candidate>,
    last_error: Option<OracleError>,
) -> Result<Candidate, ResolveError> {
    match (best, last_error) {
        (Some(best), _) => Ok(best),
        (None, Some(e)) => Err(e.into()),
        (None, None) => Err(ResolveError::NoCandidates),
    }
}

impl From<Candidate> for Outcome {
    fn from(c: Candidate) -> Self {
        Outcome {
            point: c.point,
            route_a: Some(c.route_a),
            route_b: Some(c.route_b),
            fallback: None,
        }
    }
}
