use axum::{routing::get, Router, http::StatusCode, response::IntoResponse};

/// Liveness probe: the process is up and serving HTTP. Mail reachability is not checked.
async fn health_check_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Routes for the health endpoint, merged into the main router.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health_check_handler))
}
