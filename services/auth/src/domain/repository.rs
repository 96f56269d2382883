#![allow(async_fn_in_trait)]

use crate::domain::types::{ChallengePurpose, DeviceSession, OtpChallenge, OtpNotification, Principal};
use crate::error::AuthServiceError;

/// Port for looking up principals in the user directory.
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, AuthServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthServiceError>;
}

/// Port for delivering OTP codes out of band. Best-effort: callers swallow
/// failures so delivery problems never block issuance.
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        identifier: &str,
        notification: &OtpNotification,
    ) -> Result<(), AuthServiceError>;
}

/// Store for per-device sessions, their refresh-credential mirror, and the
/// per-principal device index.
pub trait SessionStore: Send + Sync {
    /// Write index entry, session record, and refresh credential. The
    /// credential goes in last: the three writes are not atomic, and a
    /// partial register must degrade to "not logged in", never to a live
    /// credential missing from the index.
    async fn register(
        &self,
        principal_id: &str,
        session: &DeviceSession,
        refresh_token: &str,
    ) -> Result<(), AuthServiceError>;

    /// The stored refresh token string, if the device still has one.
    async fn lookup_refresh(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<Option<String>, AuthServiceError>;

    /// Sliding renewal: update `last_activity_at` and push both TTLs out.
    async fn touch(&self, principal_id: &str, device_id: &str) -> Result<(), AuthServiceError>;

    async fn device_ids(&self, principal_id: &str) -> Result<Vec<String>, AuthServiceError>;

    /// Session records for the given ids, positionally; `None` where the
    /// record has already expired out from under the index.
    async fn fetch_sessions(
        &self,
        principal_id: &str,
        device_ids: &[String],
    ) -> Result<Vec<Option<DeviceSession>>, AuthServiceError>;

    /// Drop stale ids from the device index.
    async fn prune_index(
        &self,
        principal_id: &str,
        device_ids: &[String],
    ) -> Result<(), AuthServiceError>;

    /// Delete one device's credential + session and unindex it. Returns
    /// `false` if neither key existed.
    async fn remove_device(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<bool, AuthServiceError>;

    /// Delete the device index key itself.
    async fn clear_index(&self, principal_id: &str) -> Result<(), AuthServiceError>;
}

/// Store for pending OTP challenges and resend cooldowns.
pub trait ChallengeStore: Send + Sync {
    /// Upsert a challenge. TTL derives from `expires_at`, so attempt-count
    /// rewrites keep the original deadline.
    async fn put(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError>;

    async fn get(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<Option<OtpChallenge>, AuthServiceError>;

    async fn delete(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<(), AuthServiceError>;

    /// Start the resend cooldown, or report the seconds remaining on one
    /// that is already running.
    async fn try_set_cooldown(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<Option<u64>, AuthServiceError>;
}
