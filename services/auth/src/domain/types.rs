use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Directory record for a principal (the subset auth decisions need).
#[derive(Debug, Clone, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role: String,
}

/// Per-device session record mirrored in the session store.
///
/// One record per login event: a repeat login from the same hardware gets a
/// fresh device id and a fresh record. `principal_id` is also part of the
/// store key; it is kept in the record so each record is self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceSession {
    pub device_id: String,
    pub principal_id: String,
    pub descriptor: String,
    pub origin: String,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

/// Sensitive operations an OTP challenge can authorize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePurpose {
    PasswordReset,
    EmailChange,
}

impl ChallengePurpose {
    /// All purposes, for revocation fan-out.
    pub const ALL: [ChallengePurpose; 2] =
        [ChallengePurpose::PasswordReset, ChallengePurpose::EmailChange];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasswordReset => "password_reset",
            Self::EmailChange => "email_change",
        }
    }
}

/// Pending OTP challenge, keyed by (purpose, identifier).
///
/// At most one is outstanding per key; issuing a new one supersedes the
/// prior challenge wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub purpose: ChallengePurpose,
    pub identifier: String,
    pub code: String,
    pub attempts: u32,
    /// Limit snapshot taken at issue time, so outstanding challenges keep
    /// their budget if the tunable changes.
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }

    pub fn attempts_remaining(&self) -> u32 {
        self.max_attempts.saturating_sub(self.attempts)
    }
}

/// Payload handed to the notifier when a code goes out.
#[derive(Debug, Clone, Serialize)]
pub struct OtpNotification {
    pub purpose: ChallengePurpose,
    pub code: String,
    pub expires_in: u64,
}

/// Access token time-to-live in seconds (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: u64 = 900;

/// Refresh token time-to-live in seconds (30 days). Session records and the
/// refresh credential mirror share this TTL so they expire together.
pub const REFRESH_TOKEN_TTL_SECS: u64 = 2_592_000;

/// Confirmation token time-to-live in seconds (10 minutes).
pub const CONFIRMATION_TOKEN_TTL_SECS: u64 = 600;

/// OTP code length in digits.
pub const OTP_CODE_LEN: usize = 6;

/// OTP challenge time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 600;

/// Maximum verification attempts per challenge.
pub const OTP_MAX_ATTEMPTS: u32 = 5;

/// Minimum interval between OTP sends for the same (purpose, identifier).
pub const OTP_RESEND_COOLDOWN_SECS: u64 = 60;
