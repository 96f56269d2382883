use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Connection, Pool};

use crate::domain::repository::{ChallengeStore, SessionStore};
use crate::domain::types::{
    ChallengePurpose, DeviceSession, OTP_RESEND_COOLDOWN_SECS, OtpChallenge,
    REFRESH_TOKEN_TTL_SECS,
};
use crate::error::AuthServiceError;

/// Upper bound on any single store round trip. An unreachable store must
/// surface as an infrastructure failure, never hang a request or be read as
/// "no revocation exists".
const STORE_OP_TIMEOUT: Duration = Duration::from_secs(3);

async fn conn(pool: &Pool) -> Result<Connection, AuthServiceError> {
    match tokio::time::timeout(STORE_OP_TIMEOUT, pool.get()).await {
        Ok(Ok(conn)) => Ok(conn),
        Ok(Err(e)) => Err(AuthServiceError::StoreUnavailable(e.into())),
        Err(_) => Err(AuthServiceError::StoreTimeout),
    }
}

async fn bounded<F, T>(fut: F) -> Result<T, AuthServiceError>
where
    F: Future<Output = Result<T, deadpool_redis::redis::RedisError>>,
{
    match tokio::time::timeout(STORE_OP_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(AuthServiceError::StoreUnavailable(e.into())),
        Err(_) => Err(AuthServiceError::StoreTimeout),
    }
}

// ── Session store ────────────────────────────────────────────────────────────

fn refresh_key(principal_id: &str, device_id: &str) -> String {
    format!("refresh:{}:{}", principal_id, device_id)
}

fn session_key(principal_id: &str, device_id: &str) -> String {
    format!("session:{}:{}", principal_id, device_id)
}

fn devices_key(principal_id: &str) -> String {
    format!("devices:{}", principal_id)
}

#[derive(Clone)]
pub struct RedisSessionStore {
    pub pool: Pool,
}

impl SessionStore for RedisSessionStore {
    async fn register(
        &self,
        principal_id: &str,
        session: &DeviceSession,
        refresh_token: &str,
    ) -> Result<(), AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let session_json =
            serde_json::to_string(session).map_err(|e| AuthServiceError::Internal(e.into()))?;

        // Credential last: these writes are not atomic, and a partial
        // register must degrade to "not logged in" rather than leave a live
        // credential outside the index.
        let (): () = bounded(conn.sadd(devices_key(principal_id), &session.device_id)).await?;
        let (): () = bounded(conn.set_ex(
            session_key(principal_id, &session.device_id),
            session_json,
            REFRESH_TOKEN_TTL_SECS,
        ))
        .await?;
        let (): () = bounded(conn.set_ex(
            refresh_key(principal_id, &session.device_id),
            refresh_token,
            REFRESH_TOKEN_TTL_SECS,
        ))
        .await?;
        Ok(())
    }

    async fn lookup_refresh(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<Option<String>, AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let stored: Option<String> = bounded(conn.get(refresh_key(principal_id, device_id))).await?;
        Ok(stored)
    }

    async fn touch(&self, principal_id: &str, device_id: &str) -> Result<(), AuthServiceError> {
        let mut conn = conn(&self.pool).await?;

        let raw: Option<String> = bounded(conn.get(session_key(principal_id, device_id))).await?;
        if let Some(raw) = raw {
            match serde_json::from_str::<DeviceSession>(&raw) {
                Ok(mut session) => {
                    session.last_activity_at = Utc::now();
                    let json = serde_json::to_string(&session)
                        .map_err(|e| AuthServiceError::Internal(e.into()))?;
                    let (): () = bounded(conn.set_ex(
                        session_key(principal_id, device_id),
                        json,
                        REFRESH_TOKEN_TTL_SECS,
                    ))
                    .await?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "session record failed to parse, skipping rewrite");
                }
            }
        }

        let _: i64 = bounded(conn.expire(
            refresh_key(principal_id, device_id),
            REFRESH_TOKEN_TTL_SECS as i64,
        ))
        .await?;
        Ok(())
    }

    async fn device_ids(&self, principal_id: &str) -> Result<Vec<String>, AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let ids: Vec<String> = bounded(conn.smembers(devices_key(principal_id))).await?;
        Ok(ids)
    }

    async fn fetch_sessions(
        &self,
        principal_id: &str,
        device_ids: &[String],
    ) -> Result<Vec<Option<DeviceSession>>, AuthServiceError> {
        if device_ids.is_empty() {
            return Ok(vec![]);
        }
        let mut conn = conn(&self.pool).await?;
        let keys: Vec<String> = device_ids
            .iter()
            .map(|device_id| session_key(principal_id, device_id))
            .collect();
        let raw: Vec<Option<String>> = bounded(conn.mget(keys)).await?;
        Ok(raw
            .into_iter()
            .map(|slot| {
                slot.and_then(|json| match serde_json::from_str(&json) {
                    Ok(session) => Some(session),
                    Err(e) => {
                        tracing::warn!(error = %e, "dropping unreadable session record");
                        None
                    }
                })
            })
            .collect())
    }

    async fn prune_index(
        &self,
        principal_id: &str,
        device_ids: &[String],
    ) -> Result<(), AuthServiceError> {
        if device_ids.is_empty() {
            return Ok(());
        }
        let mut conn = conn(&self.pool).await?;
        let (): () = bounded(conn.srem(devices_key(principal_id), device_ids)).await?;
        Ok(())
    }

    async fn remove_device(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<bool, AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let keys = vec![
            refresh_key(principal_id, device_id),
            session_key(principal_id, device_id),
        ];
        let removed: i64 = bounded(conn.del(keys)).await?;
        let (): () = bounded(conn.srem(devices_key(principal_id), device_id)).await?;
        Ok(removed > 0)
    }

    async fn clear_index(&self, principal_id: &str) -> Result<(), AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let (): () = bounded(conn.del(devices_key(principal_id))).await?;
        Ok(())
    }
}

// ── Challenge store ──────────────────────────────────────────────────────────

fn challenge_key(purpose: ChallengePurpose, identifier: &str) -> String {
    format!("otp:{}:{}", purpose.as_str(), identifier)
}

fn cooldown_key(purpose: ChallengePurpose, identifier: &str) -> String {
    format!("otp_cooldown:{}:{}", purpose.as_str(), identifier)
}

#[derive(Clone)]
pub struct RedisChallengeStore {
    pub pool: Pool,
}

impl ChallengeStore for RedisChallengeStore {
    async fn put(&self, challenge: &OtpChallenge) -> Result<(), AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let json =
            serde_json::to_string(challenge).map_err(|e| AuthServiceError::Internal(e.into()))?;
        // TTL tracks the challenge deadline, so attempt-count rewrites never
        // extend it.
        let remaining = (challenge.expires_at - Utc::now()).num_seconds().max(1) as u64;
        let (): () = bounded(conn.set_ex(
            challenge_key(challenge.purpose, &challenge.identifier),
            json,
            remaining,
        ))
        .await?;
        Ok(())
    }

    async fn get(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<Option<OtpChallenge>, AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let raw: Option<String> = bounded(conn.get(challenge_key(purpose, identifier))).await?;
        match raw {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| AuthServiceError::Internal(e.into())),
        }
    }

    async fn delete(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<(), AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let (): () = bounded(conn.del(challenge_key(purpose, identifier))).await?;
        Ok(())
    }

    async fn try_set_cooldown(
        &self,
        purpose: ChallengePurpose,
        identifier: &str,
    ) -> Result<Option<u64>, AuthServiceError> {
        let mut conn = conn(&self.pool).await?;
        let key = cooldown_key(purpose, identifier);

        // TTL is -2 for a missing key, -1 for a key without expiry.
        let ttl: i64 = bounded(conn.ttl(&key)).await?;
        if ttl > 0 {
            return Ok(Some(ttl as u64));
        }

        let (): () = bounded(conn.set_ex(&key, 1u8, OTP_RESEND_COOLDOWN_SECS)).await?;
        Ok(None)
    }
}
