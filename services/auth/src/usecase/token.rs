use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};

use vitrine_auth_types::token::{
    AccessClaims, ConfirmationClaims, RefreshClaims, TokenKind, validate_refresh_token,
};

use crate::domain::repository::{SessionStore, UserDirectory};
use crate::domain::types::{
    ACCESS_TOKEN_TTL_SECS, CONFIRMATION_TOKEN_TTL_SECS, ChallengePurpose, DeviceSession, Principal,
    REFRESH_TOKEN_TTL_SECS,
};
use crate::error::AuthServiceError;
use crate::usecase::session::device_id_for;

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Mints and verifies the platform's signed credentials.
///
/// Access and refresh tokens use separate secrets; confirmation tokens ride
/// on the access secret and rely on the kind claim for separation.
#[derive(Clone)]
pub struct CredentialIssuer {
    pub access_secret: String,
    pub refresh_secret: String,
}

impl CredentialIssuer {
    /// Returns the token together with its absolute expiry (unix seconds).
    pub fn issue_access(&self, principal: &Principal) -> Result<(String, u64), AuthServiceError> {
        let iat = now_secs();
        let exp = iat + ACCESS_TOKEN_TTL_SECS;
        let claims = AccessClaims {
            sub: principal.id.clone(),
            role: principal.role.clone(),
            email: principal.email.clone(),
            iat,
            exp,
            kind: TokenKind::Access,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;
        Ok((token, exp))
    }

    pub fn issue_refresh(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<String, AuthServiceError> {
        let iat = now_secs();
        let claims = RefreshClaims {
            sub: principal_id.to_owned(),
            device_id: device_id.to_owned(),
            iat,
            exp: iat + REFRESH_TOKEN_TTL_SECS,
            kind: TokenKind::Refresh,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.refresh_secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    /// Minted on OTP success; proves a recently verified challenge for one
    /// purpose to the service performing the sensitive operation.
    pub fn issue_confirmation(
        &self,
        identifier: &str,
        purpose: ChallengePurpose,
    ) -> Result<String, AuthServiceError> {
        let iat = now_secs();
        let claims = ConfirmationClaims {
            sub: identifier.to_owned(),
            purpose: purpose.as_str().to_owned(),
            iat,
            exp: iat + CONFIRMATION_TOKEN_TTL_SECS,
            kind: TokenKind::Confirmation,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.access_secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))
    }

    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AuthServiceError> {
        Ok(validate_refresh_token(token, &self.refresh_secret)?)
    }
}

// ── CreateSession (login) ────────────────────────────────────────────────────

pub struct CreateSessionInput {
    pub principal_id: String,
    pub descriptor: String,
    pub origin: String,
}

#[derive(Debug)]
pub struct CreateSessionOutput {
    pub access_token: String,
    pub refresh_token: String,
    pub device_id: String,
    pub expires_in: u64,
}

pub struct CreateSessionUseCase<U: UserDirectory, S: SessionStore> {
    pub users: U,
    pub sessions: S,
    pub issuer: CredentialIssuer,
}

impl<U: UserDirectory, S: SessionStore> CreateSessionUseCase<U, S> {
    pub async fn execute(
        &self,
        input: CreateSessionInput,
    ) -> Result<CreateSessionOutput, AuthServiceError> {
        let principal = self
            .users
            .find_by_id(&input.principal_id)
            .await?
            .ok_or(AuthServiceError::PrincipalNotFound)?;

        let device_id = device_id_for(&input.descriptor, &input.origin);
        let (access_token, _) = self.issuer.issue_access(&principal)?;
        let refresh_token = self.issuer.issue_refresh(&principal.id, &device_id)?;

        let now = Utc::now();
        let session = DeviceSession {
            device_id: device_id.clone(),
            principal_id: principal.id.clone(),
            descriptor: input.descriptor,
            origin: input.origin,
            created_at: now,
            last_activity_at: now,
        };
        self.sessions
            .register(&principal.id, &session, &refresh_token)
            .await?;

        Ok(CreateSessionOutput {
            access_token,
            refresh_token,
            device_id,
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }
}

// ── RefreshSession ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RefreshSessionOutput {
    pub access_token: String,
    pub expires_in: u64,
}

pub struct RefreshSessionUseCase<U: UserDirectory, S: SessionStore> {
    pub users: U,
    pub sessions: S,
    pub issuer: CredentialIssuer,
}

impl<U: UserDirectory, S: SessionStore> RefreshSessionUseCase<U, S> {
    pub async fn execute(&self, presented: &str) -> Result<RefreshSessionOutput, AuthServiceError> {
        let claims = self.issuer.verify_refresh(presented)?;

        // Signature validity is not enough: the exact token string must still
        // be mirrored in the registry, otherwise it was revoked or superseded.
        let stored = self
            .sessions
            .lookup_refresh(&claims.sub, &claims.device_id)
            .await?
            .ok_or(AuthServiceError::SessionNotFound)?;
        if stored != presented {
            return Err(AuthServiceError::SessionNotFound);
        }

        let principal = self
            .users
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AuthServiceError::InvalidToken)?;

        let (access_token, _) = self.issuer.issue_access(&principal)?;
        self.sessions.touch(&claims.sub, &claims.device_id).await?;

        Ok(RefreshSessionOutput {
            access_token,
            expires_in: ACCESS_TOKEN_TTL_SECS,
        })
    }
}
