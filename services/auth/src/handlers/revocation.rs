//! Internal hooks called by the account service after password changes and
//! account deletions. Not exposed through the gateway.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::revocation::RevocationCoordinator;

#[derive(Deserialize)]
pub struct RevocationRequest {
    pub principal_id: String,
}

pub async fn password_changed(
    State(state): State<AppState>,
    Json(body): Json<RevocationRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let coordinator = RevocationCoordinator {
        sessions: state.session_store(),
        challenges: state.challenge_store(),
        users: state.user_directory(),
    };

    coordinator.on_password_changed(&body.principal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn account_deleted(
    State(state): State<AppState>,
    Json(body): Json<RevocationRequest>,
) -> Result<StatusCode, AuthServiceError> {
    let coordinator = RevocationCoordinator {
        sessions: state.session_store(),
        challenges: state.challenge_store(),
        users: state.user_directory(),
    };

    coordinator.on_account_deleted(&body.principal_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
