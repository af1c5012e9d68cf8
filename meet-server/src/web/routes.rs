//! HTTP route handlers.

use std::fmt;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::domain::{GeoPoint, PlaceCategory, TravelMode};
use crate::engine::{EngineMetrics, ResolveError, search_radius};
use crate::oracle::{ErrorKind, PlaceOracle, RoutingOracle};

use super::dto::*;
use super::state::AppState;

/// Radius for place searches that give neither a radius nor modes.
const DEFAULT_PLACE_RADIUS_M: u32 = 500;
/// Largest radius the place oracle accepts.
const MAX_PLACE_RADIUS_M: u32 = 50_000;

/// Create the application router.
pub fn create_router<O>(state: AppState<O>) -> Router
where
    O: RoutingOracle + PlaceOracle,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/meeting-point", post(meeting_point::<O>))
        .route("/api/places", get(places::<O>))
        .route("/api/place-routes", post(place_routes::<O>))
        .route("/api/metrics", get(metrics::<O>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Resolve a fair meeting point for two parties.
async fn meeting_point<O>(
    State(state): State<AppState<O>>,
    body: Result<Json<MeetingPointRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    O: RoutingOracle + PlaceOracle,
{
    let Json(req) = body?;

    let result = state
        .engine
        .resolve_meeting_point(req.a, req.b, req.mode_a, req.mode_b)
        .await;
    let radius = search_radius(req.mode_a, req.mode_b);

    Ok(Json(MeetingPointResponse::new(&result, radius)).into_response())
}

/// Search places around a point.
async fn places<O>(
    State(state): State<AppState<O>>,
    query: Result<Query<PlacesQuery>, QueryRejection>,
) -> Result<Json<PlacesResponse>, AppError>
where
    O: RoutingOracle + PlaceOracle,
{
    let Query(q) = query?;

    let center = GeoPoint::new(q.lat, q.lng).map_err(AppError::bad_request)?;
    let category: PlaceCategory = q.category.parse().map_err(AppError::bad_request)?;
    let mode_a = parse_mode(q.mode_a.as_deref())?;
    let mode_b = parse_mode(q.mode_b.as_deref())?;

    let radius_m = match (q.radius, mode_a, mode_b) {
        (Some(r), _, _) if r == 0 || r > MAX_PLACE_RADIUS_M => {
            return Err(AppError::BadRequest {
                message: format!("radius must be between 1 and {MAX_PLACE_RADIUS_M} meters"),
            });
        }
        (Some(r), _, _) => r,
        (None, Some(a), Some(b)) => search_radius(a, b),
        (None, _, _) => DEFAULT_PLACE_RADIUS_M,
    };

    let places = state.engine.find_places(center, category, radius_m).await;
    Ok(Json(PlacesResponse { places, radius_m }))
}

fn parse_mode(mode: Option<&str>) -> Result<Option<TravelMode>, AppError> {
    mode.map(str::parse::<TravelMode>)
        .transpose()
        .map_err(AppError::bad_request)
}

/// Route both parties to a chosen place.
async fn place_routes<O>(
    State(state): State<AppState<O>>,
    body: Result<Json<PlaceRoutesRequest>, JsonRejection>,
) -> Result<Response, AppError>
where
    O: RoutingOracle + PlaceOracle,
{
    let Json(req) = body?;

    let routes = state
        .engine
        .routes_to_place(req.a, req.b, req.mode_a, req.mode_b, req.place_location)
        .await?;

    Ok(Json(PlaceRoutesResponse::from(&routes)).into_response())
}

/// Cache and queue counters.
async fn metrics<O>(State(state): State<AppState<O>>) -> Json<EngineMetrics>
where
    O: RoutingOracle + PlaceOracle,
{
    Json(state.engine.metrics())
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Unavailable { message: String },
    Internal { message: String },
}

impl AppError {
    fn bad_request(e: impl fmt::Display) -> Self {
        AppError::BadRequest {
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::BadRequest {
            message: e.body_text(),
        }
    }
}

impl From<ResolveError> for AppError {
    fn from(e: ResolveError) -> Self {
        let message = e.to_string();
        match e.kind() {
            ErrorKind::OracleNoRoute => AppError::NotFound { message },
            ErrorKind::OracleAuth | ErrorKind::OracleTransient => {
                AppError::Unavailable { message }
            }
            ErrorKind::EngineInternal => AppError::Internal { message },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        tracing::warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
