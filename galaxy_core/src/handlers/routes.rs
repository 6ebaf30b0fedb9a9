//! Route table for the sidecar

use crate::{
    error::AppError,
    handlers::{
        galaxy::{handle_dependencies, handle_info, handle_root},
        health::handle_health,
    },
    AppState,
};
use axum::{http::Uri, routing::get, Router};

pub const ENDPOINTS: [&str; 4] = ["/health", "/galaxy/info", "/galaxy/root", "/galaxy/dependencies"];

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handle_health))
        .route("/galaxy/info", get(handle_info))
        .route("/galaxy/root", get(handle_root))
        .route("/galaxy/dependencies", get(handle_dependencies))
        .fallback(handle_not_found)
}

async fn handle_not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {}", uri.path()))
}
