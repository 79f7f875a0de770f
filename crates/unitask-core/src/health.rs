use std::future::Future;

use axum::extract::State;
use axum::http::StatusCode;

/// Service state that can tell whether its backing stores answer.
pub trait Readiness {
    fn ready(&self) -> impl Future<Output = bool> + Send;
}

/// Liveness check for `GET /healthz`. Answers as long as the process serves requests.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Readiness check for `GET /readyz`: `503` while a dependency is unreachable.
pub async fn readyz<S>(State(state): State<S>) -> StatusCode
where
    S: Readiness + Send + Sync,
{
    if state.ready().await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
