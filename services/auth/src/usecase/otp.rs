use chrono::{DateTime, Duration, Utc};
use rand::RngExt;

use crate::domain::repository::{ChallengeStore, Notifier, UserDirectory};
use crate::domain::types::{
    ChallengePurpose, OTP_CODE_LEN, OTP_MAX_ATTEMPTS, OTP_TTL_SECS, OtpChallenge, OtpNotification,
};
use crate::error::AuthServiceError;
use crate::usecase::token::CredentialIssuer;

/// Charset for generating OTP codes (digits only, leading zeros allowed).
const DIGITS: &[u8] = b"0123456789";

fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..OTP_CODE_LEN)
        .map(|_| DIGITS[rng.random_range(0..DIGITS.len())] as char)
        .collect()
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub identifier: String,
    pub purpose: ChallengePurpose,
}

pub struct RequestOtpUseCase<U, C, N>
where
    U: UserDirectory,
    C: ChallengeStore,
    N: Notifier,
{
    pub users: U,
    pub challenges: C,
    pub notifier: N,
}

impl<U, C, N> RequestOtpUseCase<U, C, N>
where
    U: UserDirectory,
    C: ChallengeStore,
    N: Notifier,
{
    /// Issue (or re-issue) a challenge. Succeeding without effect for an
    /// unknown identifier is deliberate: the caller must not be able to
    /// probe which identifiers exist.
    pub async fn execute(&self, input: RequestOtpInput) -> Result<(), AuthServiceError> {
        // Cooldown comes before the directory lookup so unknown identifiers
        // hit the same rate limit as known ones.
        if let Some(seconds_remaining) = self
            .challenges
            .try_set_cooldown(input.purpose, &input.identifier)
            .await?
        {
            return Err(AuthServiceError::RateLimited { seconds_remaining });
        }

        if self.users.find_by_email(&input.identifier).await?.is_none() {
            return Ok(());
        }

        let code = generate_code();
        let now = Utc::now();
        let challenge = OtpChallenge {
            purpose: input.purpose,
            identifier: input.identifier.clone(),
            code: code.clone(),
            attempts: 0,
            max_attempts: OTP_MAX_ATTEMPTS,
            created_at: now,
            expires_at: now + Duration::seconds(OTP_TTL_SECS),
        };
        // Overwrites any outstanding challenge for this key (supersession).
        self.challenges.put(&challenge).await?;

        let notification = OtpNotification {
            purpose: input.purpose,
            code,
            expires_in: OTP_TTL_SECS as u64,
        };
        if let Err(e) = self.notifier.send(&input.identifier, &notification).await {
            // Delivery is best-effort; the challenge stands and the caller
            // can re-request after the cooldown.
            tracing::warn!(error = %e, "otp notification delivery failed");
        }

        Ok(())
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub identifier: String,
    pub purpose: ChallengePurpose,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub confirmation_token: String,
}

pub struct VerifyOtpUseCase<C: ChallengeStore> {
    pub challenges: C,
    pub issuer: CredentialIssuer,
}

impl<C: ChallengeStore> VerifyOtpUseCase<C> {
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, AuthServiceError> {
        let challenge = self
            .challenges
            .get(input.purpose, &input.identifier)
            .await?
            .ok_or(AuthServiceError::ChallengeNotFound)?;

        // Store TTLs expire these passively; the re-checks below are
        // defensive against clock skew and reclaim lag.
        if challenge.is_expired() {
            self.challenges.delete(input.purpose, &input.identifier).await?;
            return Err(AuthServiceError::ChallengeExpired);
        }
        // An exhausted challenge rejects even a correct code (fail closed).
        if challenge.is_exhausted() {
            self.challenges.delete(input.purpose, &input.identifier).await?;
            return Err(AuthServiceError::ChallengeMaxAttempts);
        }

        if challenge.code == input.code {
            // Single use: consumed on success.
            self.challenges.delete(input.purpose, &input.identifier).await?;
            let confirmation_token = self
                .issuer
                .issue_confirmation(&input.identifier, input.purpose)?;
            return Ok(VerifyOtpOutput { confirmation_token });
        }

        let mut challenge = challenge;
        challenge.attempts += 1;
        if challenge.is_exhausted() {
            self.challenges.delete(input.purpose, &input.identifier).await?;
            return Err(AuthServiceError::ChallengeMaxAttempts);
        }
        self.challenges.put(&challenge).await?;
        Err(AuthServiceError::ChallengeMismatch {
            attempts_remaining: challenge.attempts_remaining(),
        })
    }
}

// ── ChallengeStatus ──────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct ChallengeStatus {
    pub attempts_remaining: u32,
    pub expires_at: DateTime<Utc>,
}

pub struct ChallengeStatusUseCase<C: ChallengeStore> {
    pub challenges: C,
}

impl<C: ChallengeStore> ChallengeStatusUseCase<C> {
    /// Read-only snapshot; never mutates attempts or TTL.
    pub async fn execute(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<ChallengeStatus, AuthServiceError> {
        let challenge = self
            .challenges
            .get(purpose, identifier)
            .await?
            .ok_or(AuthServiceError::ChallengeNotFound)?;

        if challenge.is_expired() {
            return Err(AuthServiceError::ChallengeExpired);
        }

        Ok(ChallengeStatus {
            attempts_remaining: challenge.attempts_remaining(),
            expires_at: challenge.expires_at,
        })
    }
}
