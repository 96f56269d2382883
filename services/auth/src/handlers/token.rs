use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use axum_extra::TypedHeader;
use axum_extra::headers::{Authorization, authorization::Bearer};
use serde::{Deserialize, Serialize};

use vitrine_auth_types::token::validate_access_token;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::token::{CreateSessionInput, CreateSessionUseCase, RefreshSessionUseCase};

/// First hop of `X-Forwarded-For`, or "unknown" when the gateway did not
/// set it.
fn client_origin(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn device_descriptor(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_owned()
}

// ── POST /auth/token ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateTokenRequest {
    pub principal_id: String,
}

#[derive(Serialize)]
pub struct CreateTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub device_id: String,
    pub expires_in: u64,
    pub token_type: &'static str,
}

pub async fn create_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateTokenRequest>,
) -> Result<impl IntoResponse, AuthServiceError> {
    let usecase = CreateSessionUseCase {
        users: state.user_directory(),
        sessions: state.session_store(),
        issuer: state.issuer(),
    };

    let out = usecase
        .execute(CreateSessionInput {
            principal_id: body.principal_id,
            descriptor: device_descriptor(&headers),
            origin: client_origin(&headers),
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateTokenResponse {
            access_token: out.access_token,
            refresh_token: out.refresh_token,
            device_id: out.device_id,
            expires_in: out.expires_in,
            token_type: "Bearer",
        }),
    ))
}

// ── PATCH /auth/token ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: &'static str,
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<RefreshTokenResponse>, AuthServiceError> {
    let usecase = RefreshSessionUseCase {
        users: state.user_directory(),
        sessions: state.session_store(),
        issuer: state.issuer(),
    };

    let out = usecase.execute(&body.refresh_token).await?;

    Ok(Json(RefreshTokenResponse {
        access_token: out.access_token,
        expires_in: out.expires_in,
        token_type: "Bearer",
    }))
}

// ── GET /auth/token ───────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct CheckTokenResponse {
    pub principal_id: String,
    pub role: String,
    pub email: String,
    pub expires_at: u64,
}

pub async fn check_token(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
) -> Result<Json<CheckTokenResponse>, AuthServiceError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthServiceError::NoToken)?;

    let claims = validate_access_token(bearer.token(), &state.access_token_secret)?;

    Ok(Json(CheckTokenResponse {
        principal_id: claims.sub,
        role: claims.role,
        email: claims.email,
        expires_at: claims.exp,
    }))
}
