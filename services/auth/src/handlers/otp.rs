use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::types::ChallengePurpose;
use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{
    ChallengeStatusUseCase, RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

// ── POST /auth/otp ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestOtpBody {
    pub email: String,
    pub purpose: ChallengePurpose,
}

#[derive(Serialize)]
pub struct RequestOtpResponse {
    pub accepted: bool,
}

/// The 202 body is identical whether or not the email resolves to a
/// principal; only the rate limiter may reject.
pub async fn request_otp(
    State(state): State<AppState>,
    Json(body): Json<RequestOtpBody>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = RequestOtpUseCase {
        users: state.user_directory(),
        challenges: state.challenge_store(),
        notifier: state.notifier(),
    };

    usecase
        .execute(RequestOtpInput {
            identifier: body.email,
            purpose: body.purpose,
        })
        .await?;

    Ok((StatusCode::ACCEPTED, Json(RequestOtpResponse { accepted: true })))
}

// ── GET /auth/otp/status ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChallengeStatusQuery {
    pub email: String,
    pub purpose: ChallengePurpose,
}

#[derive(Serialize)]
pub struct ChallengeStatusResponse {
    pub attempts_remaining: u32,
    #[serde(serialize_with = "vitrine_core::serde::to_rfc3339_secs")]
    pub expires_at: DateTime<Utc>,
}

pub async fn otp_status(
    State(state): State<AppState>,
    Query(query): Query<ChallengeStatusQuery>,
) -> Result<Json<ChallengeStatusResponse>, AuthServiceError> {
    let usecase = ChallengeStatusUseCase {
        challenges: state.challenge_store(),
    };

    let status = usecase.execute(query.purpose, &query.email).await?;

    Ok(Json(ChallengeStatusResponse {
        attempts_remaining: status.attempts_remaining,
        expires_at: status.expires_at,
    }))
}

// ── POST /auth/otp/verify ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpBody {
    pub email: String,
    pub purpose: ChallengePurpose,
    pub code: String,
}

#[derive(Serialize)]
pub struct VerifyOtpResponse {
    pub confirmation_token: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Result<Json<VerifyOtpResponse>, AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        challenges: state.challenge_store(),
        issuer: state.issuer(),
    };

    let out = usecase
        .execute(VerifyOtpInput {
            identifier: body.email,
            purpose: body.purpose,
            code: body.code,
        })
        .await?;

    Ok(Json(VerifyOtpResponse {
        confirmation_token: out.confirmation_token,
    }))
}
