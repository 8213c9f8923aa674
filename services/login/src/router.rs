use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use littlenote_core::health::{healthz, readyz};
use littlenote_core::middleware::request_id_layer;

use crate::handlers::{
    login::{front_page, submit_login},
    notes::{notes_page, sign_out},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Login flow: one endpoint, GET renders, POST advances
        .route("/", get(front_page))
        .route("/", post(submit_login))
        // Authenticated area
        .route("/notes", get(notes_page))
        .route("/logout", post(sign_out))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
