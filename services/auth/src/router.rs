use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use vitrine_core::middleware::{propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    health::{healthz, readyz},
    otp::{otp_status, request_otp, verify_otp},
    revocation::{account_deleted, password_changed},
    sessions::{list_sessions, logout_all, logout_device},
    token::{check_token, create_token, refresh_token},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Token
        .route("/auth/token", get(check_token))
        .route("/auth/token", post(create_token))
        .route("/auth/token", patch(refresh_token))
        // Sessions
        .route("/auth/sessions", get(list_sessions))
        .route("/auth/sessions", delete(logout_all))
        .route("/auth/sessions/{device_id}", delete(logout_device))
        // OTP challenges
        .route("/auth/otp", post(request_otp))
        .route("/auth/otp/status", get(otp_status))
        .route("/auth/otp/verify", post(verify_otp))
        // Internal revocation hooks
        .route("/auth/revocations/password-changed", post(password_changed))
        .route("/auth/revocations/account-deleted", post(account_deleted))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http())
                .layer(propagate_request_id_layer()),
        )
        .with_state(state)
}
