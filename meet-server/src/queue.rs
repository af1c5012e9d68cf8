//! Request queue for route queries.
//!
//! A single worker task drains a FIFO channel and dispatches one route query
//! at a time, at least `spacing` apart, so bursts from the engine never
//! reach the oracle all at once. Every query goes through the cache. Each
//! caller gets its own reply channel, so one failed request fails only that
//! caller.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, sleep_until};

use crate::cache::CachedOracle;
use crate::domain::{GeoPoint, RouteResult, TravelMode};
use crate::oracle::{OracleError, PlaceOracle, RoutingOracle};

type RouteReply = oneshot::Sender<Result<Arc<RouteResult>, OracleError>>;

/// Configuration for the request queue.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Minimum time between two dispatches.
    pub spacing: Duration,

    /// Pending requests the channel holds before `enqueue` waits.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            spacing: Duration::from_millis(100),
            capacity: 1024,
        }
    }
}

/// A route query waiting for the worker.
struct RouteRequest {
    origin: GeoPoint,
    destination: GeoPoint,
    mode: TravelMode,
    reply: RouteReply,
}

/// Counters for one queue.
#[derive(Debug, Default)]
pub struct QueueMetrics {
    enqueued: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`QueueMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueMetricsSnapshot {
    pub enqueued: u64,
    pub completed: u64,
    pub failed: u64,
}

impl QueueMetrics {
    pub fn snapshot(&self) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Handle to the route query queue. Cheap to clone.
#[derive(Clone)]
pub struct RequestQueue {
    tx: mpsc::Sender<RouteRequest>,
    metrics: Arc<QueueMetrics>,
}

impl RequestQueue {
    /// Spawn the worker task and return a handle to it.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<O>(oracle: Arc<CachedOracle<O>>, config: QueueConfig) -> Self
    where
        O: RoutingOracle + PlaceOracle,
    {
        let (tx, rx) = mpsc::channel(config.capacity.max(1));
        let metrics = Arc::new(QueueMetrics::default());
        tokio::spawn(run_worker(oracle, rx, config.spacing, metrics.clone()));
        Self { tx, metrics }
    }

    /// Queue a route query and wait for its result.
    pub async fn enqueue(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> Result<Arc<RouteResult>, OracleError> {
        let (reply, rx) = oneshot::channel();
        let request = RouteRequest {
            origin,
            destination,
            mode,
            reply,
        };

        self.tx
            .send(request)
            .await
            .map_err(|_| OracleError::QueueClosed)?;
        self.metrics.enqueued.fetch_add(1, Ordering::Relaxed);

        rx.await.map_err(|_| OracleError::QueueClosed)?
    }

    pub fn metrics(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot()
    }
}

async fn run_worker<O>(
    oracle: Arc<CachedOracle<O>>,
    mut rx: mpsc::Receiver<RouteRequest>,
    spacing: Duration,
    metrics: Arc<QueueMetrics>,
) where
    O: RoutingOracle + PlaceOracle,
{
    let mut last_dispatch: Option<Instant> = None;

    while let Some(req) = rx.recv().await {
        if let Some(prev) = last_dispatch {
            sleep_until(prev + spacing).await;
        }
        last_dispatch = Some(Instant::now());

        let result = oracle.route(req.origin, req.destination, req.mode).await;
        match &result {
            Ok(_) => {
                metrics.completed.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                metrics.failed.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(error = %e, mode = req.mode.as_str(), "queued route failed");
            }
        }

        if req.reply.send(result).is_err() {
            tracing::debug!("route requester went away before the reply");
        }
    }

    tracing::debug!("request queue worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::domain::{Place, PlaceCategory};

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    /// Routes succeed unless the origin latitude is negative.
    struct PickyOracle;

    impl RoutingOracle for PickyOracle {
        async fn route(
            &self,
            origin: GeoPoint,
            _destination: GeoPoint,
            _mode: TravelMode,
        ) -> Result<RouteResult, OracleError> {
            if origin.lat() < 0.0 {
                return Err(OracleError::ZeroResults);
            }
            Ok(RouteResult::stationary(origin))
        }
    }

    impl PlaceOracle for PickyOracle {
        async fn nearby_search(
            &self,
            _center: GeoPoint,
            _radius_m: u32,
            _category: PlaceCategory,
        ) -> Result<Vec<Place>, OracleError> {
            Ok(Vec::new())
        }
    }

    fn queue() -> RequestQueue {
        let oracle = Arc::new(CachedOracle::new(PickyOracle, &CacheConfig::default()));
        RequestQueue::spawn(oracle, QueueConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn dispatches_are_spaced() {
        let queue = queue();
        let start = Instant::now();

        let (a, b, c) = tokio::join!(
            queue.enqueue(p(1.0, 0.0), p(0.0, 0.0), TravelMode::Driving),
            queue.enqueue(p(2.0, 0.0), p(0.0, 0.0), TravelMode::Driving),
            queue.enqueue(p(3.0, 0.0), p(0.0, 0.0), TravelMode::Driving),
        );
        assert!(a.is_ok() && b.is_ok() && c.is_ok());

        // Three dispatches, two gaps.
        assert!(start.elapsed() >= Duration::from_millis(200));
        assert_eq!(queue.metrics().completed, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failure_does_not_block_the_rest() {
        let queue = queue();

        let (bad, good) = tokio::join!(
            queue.enqueue(p(-1.0, 0.0), p(0.0, 0.0), TravelMode::Walking),
            queue.enqueue(p(1.0, 0.0), p(0.0, 0.0), TravelMode::Walking),
        );

        assert!(matches!(bad, Err(OracleError::ZeroResults)));
        assert!(good.is_ok());

        let metrics = queue.metrics();
        assert_eq!(metrics.enqueued, 2);
        assert_eq!(metrics.completed, 1);
        assert_eq!(metrics.failed, 1);
    }

    #[tokio::test]
    async fn stopped_worker_is_reported() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let queue = RequestQueue {
            tx,
            metrics: Arc::new(QueueMetrics::default()),
        };

        let err = queue
            .enqueue(p(1.0, 0.0), p(0.0, 0.0), TravelMode::Driving)
            .await
            .unwrap_err();
        assert!(matches!(err, OracleError::QueueClosed));
    }
}
