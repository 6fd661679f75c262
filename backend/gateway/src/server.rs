//! HTTP surface for MenuLens.
//!
//! Thin presentation layer: handlers translate pipeline outcomes into JSON
//! and never make decisions of their own. Uploads arrive as raw bytes in
//! the request body.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use menulens_core::ExtractionResult;
use menulens_pipeline::{MenuVisualization, Pipeline};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    /// Original filename, preserved inside the storage key.
    filename: Option<String>,
}

/// Build the Axum router with all API routes.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/extract", post(extract))
        .route("/api/visualize", post(visualize))
        .route("/api/uploads", get(uploads))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the MenuLens HTTP server.
pub async fn start_server(addr: SocketAddr, state: GatewayState) -> Result<()> {
    let app = build_router(state);
    info!("menulens HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "menulens",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Extract dish records from a menu image without generating anything.
async fn extract(State(state): State<GatewayState>, body: Bytes) -> Json<ExtractionResult> {
    info!(size = body.len(), "received menu image for extraction");
    Json(state.pipeline.extract(&body).await)
}

/// Full cycle: archive the upload, extract, generate one image per dish.
async fn visualize(
    State(state): State<GatewayState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Json<MenuVisualization> {
    info!(size = body.len(), "received menu image for visualization");
    let filename = params.filename.unwrap_or_else(|| "menu.jpg".to_string());
    Json(state.pipeline.run(&body, &filename).await)
}

/// Keys of previously archived menu uploads.
async fn uploads(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({ "uploads": state.pipeline.archived_uploads().await }))
}
