// src/api/http/router.rs
// HTTP router composition.

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::turn::{health_handler, reset_handler, turn_handler};
use crate::state::AppState;

pub fn build_router(app_state: Arc<AppState>, cors_origin: &str, request_timeout: Duration) -> Router {
    let cors = cors_layer(cors_origin);

    Router::new()
        .route("/health", get(health_handler))
        .route("/turn", post(turn_handler))
        .route("/reset", post(reset_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origin == "*" {
        layer.allow_origin(Any)
    } else {
        match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("invalid CORS origin {:?}; allowing any", origin);
                layer.allow_origin(Any)
            }
        }
    }
}
