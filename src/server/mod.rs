pub mod api;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::constants::FETCH_RATE_LIMIT_PER_MINUTE;
use crate::error::{AppError, Result};
use crate::services::{MemoizedSource, YahooChartClient};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<MemoizedSource<YahooChartClient>>,
}

/// Start the axum server
pub async fn serve(port: u16) -> Result<()> {
    let client = YahooChartClient::new(true, FETCH_RATE_LIMIT_PER_MINUTE)?;
    let app_state = AppState {
        source: Arc::new(MemoizedSource::new(client)),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET])
        .allow_headers(Any);

    tracing::info!("Registering routes:");
    tracing::info!("  GET /chart?symbols=MSFT,GE&start_date=2020-01-01&frequency=weekly");
    tracing::info!("  GET /health");

    let app = Router::new()
        .route("/chart", get(api::get_chart_handler))
        .route("/health", get(api::health_handler))
        .layer(cors)
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Network(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Network(format!("Server error: {}", e)))?;

    Ok(())
}
