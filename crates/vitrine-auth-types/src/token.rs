//! Signed credential claims and their validation rules.
//!
//! Three token kinds circulate in the platform, each with its own claim
//! schema and lifetime:
//!
//! | kind           | proves                              | signed with    |
//! |----------------|-------------------------------------|----------------|
//! | `access`       | who the caller is, for a short time | access secret  |
//! | `refresh`      | an open session on one device       | refresh secret |
//! | `confirmation` | a recently verified OTP challenge   | access secret  |
//!
//! Every token embeds its kind as a claim. Validation rejects a token whose
//! kind does not match the expected one before any signature check, so a
//! refresh token presented where an access token belongs fails with
//! [`TokenError::WrongKind`] even though the secrets differ too.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, errors::ErrorKind,
};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;

/// Discriminator claim carried by every token the platform mints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    Confirmation,
}

/// Claims of a short-lived access token.
///
/// `role` and `email` are snapshots taken at issue time; the gateway trusts
/// them for the token's lifetime rather than re-reading the directory on
/// every request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct AccessClaims {
    /// Principal id in the user directory.
    pub sub: String,
    pub role: String,
    pub email: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

/// Claims of a long-lived refresh token, bound to one device.
///
/// Only the auth service ever validates these; a refresh token is worthless
/// unless its exact string is still mirrored in the session store.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct RefreshClaims {
    pub sub: String,
    pub device_id: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

/// Claims of a confirmation token minted after a successful OTP check.
///
/// `purpose` names the sensitive operation the challenge authorized, e.g.
/// `password_reset`. The consuming service must check it matches the
/// operation being performed.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct ConfirmationClaims {
    pub sub: String,
    pub purpose: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token is expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("token kind does not match the expected kind")]
    WrongKind,
}

#[derive(Deserialize)]
struct KindOnly {
    kind: Option<TokenKind>,
}

/// Read the `kind` claim without checking the signature.
///
/// Only used to reject mismatched kinds early; acceptance always goes
/// through full validation against the expected kind's own secret.
fn peek_kind(token: &str) -> Option<TokenKind> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let KindOnly { kind } = serde_json::from_slice(&bytes).ok()?;
    kind
}

fn decode_claims<T: serde::de::DeserializeOwned>(
    token: &str,
    secret: &str,
    expected: TokenKind,
) -> Result<T, TokenError> {
    if let Some(kind) = peek_kind(token) {
        if kind != expected {
            return Err(TokenError::WrongKind);
        }
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

    Ok(data.claims)
}

/// Validate an access token and return its claims.
///
/// Any consumer that authenticates requests calls this with the shared
/// access secret.
pub fn validate_access_token(token: &str, secret: &str) -> Result<AccessClaims, TokenError> {
    decode_claims(token, secret, TokenKind::Access)
}

/// Validate a refresh token and return its claims.
///
/// Signature validity is necessary but not sufficient: the auth service must
/// still find the exact token string in the session store before honoring it.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<RefreshClaims, TokenError> {
    decode_claims(token, secret, TokenKind::Refresh)
}

/// Validate a confirmation token and return its claims.
///
/// The caller still has to match `purpose` against the operation it is about
/// to perform.
pub fn validate_confirmation_token(
    token: &str,
    secret: &str,
) -> Result<ConfirmationClaims, TokenError> {
    decode_claims(token, secret, TokenKind::Confirmation)
}
