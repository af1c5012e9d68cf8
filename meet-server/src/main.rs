use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use meet_server::engine::MeetingPointEngine;
use meet_server::oracle::{
    GoogleMapsClient, GoogleMapsConfig, PlaceOracle, RoutingOracle, StraightLineOracle,
};
use meet_server::web::{AppState, create_router};

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("meet_server=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let addr_str = std::env::var("MEET_SERVER_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
    let addr: SocketAddr = match addr_str.parse() {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(addr = %addr_str, error = %e, "invalid MEET_SERVER_ADDR");
            std::process::exit(1);
        }
    };

    let result = match std::env::var("GOOGLE_MAPS_API_KEY") {
        Ok(key) => match GoogleMapsClient::new(GoogleMapsConfig::new(key)) {
            Ok(client) => serve(client, addr).await,
            Err(e) => {
                tracing::error!(error = %e, "failed to create Google Maps client");
                std::process::exit(1);
            }
        },
        Err(_) => {
            tracing::warn!(
                "GOOGLE_MAPS_API_KEY not set, using straight-line routes and synthetic places"
            );
            serve(StraightLineOracle::new(), addr).await
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "server stopped");
        std::process::exit(1);
    }
}

async fn serve<O>(oracle: O, addr: SocketAddr) -> std::io::Result<()>
where
    O: RoutingOracle + PlaceOracle,
{
    let engine = MeetingPointEngine::with_defaults(oracle);
    let app = create_router(AppState::new(engine));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Meeting point server listening on http://{addr}");
    tracing::info!("  GET  /health             - Health check");
    tracing::info!("  POST /api/meeting-point  - Resolve a meeting point");
    tracing::info!("  GET  /api/places         - Places around a point");
    tracing::info!("  POST /api/place-routes   - Route both parties to a place");
    tracing::info!("  GET  /api/metrics        - Cache and queue counters");

    axum::serve(listener, app).await
}
