pub mod error;
pub mod handlers;
pub mod models;
pub mod state;

pub use state::ApiState;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::infra::http::RouterState;
use crate::infra::http::middleware::{log_responses, set_request_context};

pub fn build_api_router(state: RouterState) -> Router<RouterState> {
    Router::new()
        .route("/api/v1/sop", post(handlers::generate_sop))
        .route("/api/v1/export", post(handlers::export_sop))
        .route("/api/v1/chat", post(handlers::chat))
        .route("/api/v1/dashboard", get(handlers::dashboard))
        .route("/api/v1/incidents", post(handlers::store_incident))
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
