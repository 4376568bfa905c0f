//! HTTP API module - rendered view and state endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::feed::ImageFeed;
use crate::view;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub feed: Arc<ImageFeed>,
}

/// Build the API router
pub fn router(feed: Arc<ImageFeed>) -> Router {
    let state = AppState { feed };

    Router::new()
        .route("/", get(page))
        .route("/state", get(feed_state))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rendered view
async fn page(State(state): State<AppState>) -> impl IntoResponse {
    Html(view::render_page(&state.feed.state()))
}

/// JSON snapshot of the feed
async fn feed_state(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.feed.state().snapshot())
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        feed: state.feed.state().label(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    feed: &'static str,
    version: &'static str,
}
