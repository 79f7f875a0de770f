use axum::{
    Router,
    http::HeaderValue,
    routing::{delete, get, post, put},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use unitask_core::error::not_found;
use unitask_core::health::{healthz, readyz};
use unitask_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    account::{create_account, delete_account, get_account, list_accounts, update_account},
    auth::login,
};
use crate::state::AppState;

async fn index() -> &'static str {
    "task management accounts service is running"
}

/// The admin console is served from another origin and sends a bearer token,
/// so preflight must allow the `Authorization` header.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = if origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };
    layer.allow_methods(Any).allow_headers(Any)
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.cors_origins);
    Router::new()
        .route("/", get(index))
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz::<AppState>))
        // Login
        .route("/auth/login", post(login))
        // Accounts
        .route("/accounts/{kind}", post(create_account))
        .route("/accounts/{kind}", get(list_accounts))
        .route("/accounts/{kind}/{id}", get(get_account))
        .route("/accounts/{kind}/{id}", put(update_account))
        .route("/accounts/{kind}/{id}", delete(delete_account))
        .fallback(not_found)
        .layer(cors)
        .layer(propagate_request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
