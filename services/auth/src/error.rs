use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use vitrine_auth_types::token::TokenError;

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("no token provided")]
    NoToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("wrong token kind")]
    WrongTokenKind,
    #[error("principal not found")]
    PrincipalNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("device not found")]
    DeviceNotFound,
    #[error("challenge not found")]
    ChallengeNotFound,
    #[error("challenge expired")]
    ChallengeExpired,
    #[error("code mismatch")]
    ChallengeMismatch { attempts_remaining: u32 },
    #[error("too many failed attempts")]
    ChallengeMaxAttempts,
    #[error("resend cooldown active")]
    RateLimited { seconds_remaining: u64 },
    #[error("store operation timed out")]
    StoreTimeout,
    #[error("store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoToken => "NO_TOKEN",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::WrongTokenKind => "WRONG_TOKEN_KIND",
            Self::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::DeviceNotFound => "DEVICE_NOT_FOUND",
            Self::ChallengeNotFound => "CHALLENGE_NOT_FOUND",
            Self::ChallengeExpired => "CHALLENGE_EXPIRED",
            Self::ChallengeMismatch { .. } => "CHALLENGE_MISMATCH",
            Self::ChallengeMaxAttempts => "CHALLENGE_MAX_ATTEMPTS",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::StoreTimeout => "STORE_TIMEOUT",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl From<TokenError> for AuthServiceError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::ExpiredToken,
            TokenError::WrongKind => Self::WrongTokenKind,
            TokenError::InvalidSignature | TokenError::Malformed => Self::InvalidToken,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NoToken
            | Self::InvalidToken
            | Self::ExpiredToken
            | Self::WrongTokenKind
            | Self::SessionNotFound
            | Self::ChallengeMismatch { .. } => StatusCode::UNAUTHORIZED,
            Self::PrincipalNotFound | Self::DeviceNotFound | Self::ChallengeNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::ChallengeExpired => StatusCode::GONE,
            Self::ChallengeMaxAttempts | Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::StoreTimeout | Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 5xx only; tower-http TraceLayer already records method/uri/status
        // for all requests, and 4xx are expected client outcomes.
        match &self {
            Self::Internal(e) => tracing::error!(error = %e, kind = "INTERNAL", "internal error"),
            Self::StoreUnavailable(e) => {
                tracing::error!(error = %e, kind = "STORE_UNAVAILABLE", "store unavailable")
            }
            Self::StoreTimeout => {
                tracing::error!(kind = "STORE_TIMEOUT", "store operation timed out")
            }
            _ => {}
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        match &self {
            Self::ChallengeMismatch { attempts_remaining } => {
                body["attempts_remaining"] = (*attempts_remaining).into();
            }
            Self::RateLimited { seconds_remaining } => {
                body["seconds_remaining"] = (*seconds_remaining).into();
            }
            _ => {}
        }
        let mut response = (status, axum::Json(body)).into_response();
        if let Self::RateLimited { seconds_remaining } = self {
            response.headers_mut().insert(
                header::RETRY_AFTER,
                HeaderValue::from_str(&seconds_remaining.to_string()).unwrap(),
            );
        }
        response
    }
}
