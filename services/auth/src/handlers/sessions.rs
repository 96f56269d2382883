use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use vitrine_auth_types::identity::IdentityHeaders;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::revocation::RevocationCoordinator;
use crate::usecase::session::ListSessionsUseCase;

#[derive(Serialize)]
pub struct SessionResponse {
    pub device_id: String,
    pub descriptor: String,
    pub origin: String,
    #[serde(serialize_with = "vitrine_core::serde::to_rfc3339_secs")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "vitrine_core::serde::to_rfc3339_secs")]
    pub last_activity_at: DateTime<Utc>,
}

// ── GET /auth/sessions ────────────────────────────────────────────────────────

pub async fn list_sessions(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<Json<Vec<SessionResponse>>, AuthServiceError> {
    let usecase = ListSessionsUseCase {
        sessions: state.session_store(),
    };

    let sessions = usecase.execute(&identity.user_id).await?;

    Ok(Json(
        sessions
            .into_iter()
            .map(|s| SessionResponse {
                device_id: s.device_id,
                descriptor: s.descriptor,
                origin: s.origin,
                created_at: s.created_at,
                last_activity_at: s.last_activity_at,
            })
            .collect(),
    ))
}

// ── DELETE /auth/sessions/{device_id} ─────────────────────────────────────────

pub async fn logout_device(
    State(state): State<AppState>,
    identity: IdentityHeaders,
    Path(device_id): Path<String>,
) -> Result<StatusCode, AuthServiceError> {
    let coordinator = RevocationCoordinator {
        sessions: state.session_store(),
        challenges: state.challenge_store(),
        users: state.user_directory(),
    };

    coordinator.on_logout(&identity.user_id, &device_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── DELETE /auth/sessions ─────────────────────────────────────────────────────

pub async fn logout_all(
    State(state): State<AppState>,
    identity: IdentityHeaders,
) -> Result<StatusCode, AuthServiceError> {
    let coordinator = RevocationCoordinator {
        sessions: state.session_store(),
        challenges: state.challenge_store(),
        users: state.user_directory(),
    };

    coordinator.on_logout_everywhere(&identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
