use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Handler for `GET /healthz` (liveness).
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` (readiness, checks store reachability).
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    let Ok(mut conn) = state.redis.get().await else {
        return StatusCode::SERVICE_UNAVAILABLE;
    };
    let pong: Result<String, _> = deadpool_redis::redis::cmd("PING")
        .query_async(&mut conn)
        .await;
    match pong {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
