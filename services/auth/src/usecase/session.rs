use std::time::{SystemTime, UNIX_EPOCH};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngExt;
use sha2::{Digest, Sha256};

use crate::domain::reconcile::{Reconciled, split_live};
use crate::domain::repository::SessionStore;
use crate::domain::types::DeviceSession;
use crate::error::AuthServiceError;

/// Derive an opaque device id for one login event.
///
/// Timestamp and salt are folded into the hash so a repeat login from the
/// same browser yields a new id: one session slot per login, not per
/// physical device.
pub fn device_id_for(descriptor: &str, origin: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_nanos();
    let salt: u64 = rand::rng().random_range(0..u64::MAX);

    let mut hasher = Sha256::new();
    hasher.update(descriptor.as_bytes());
    hasher.update(b"|");
    hasher.update(origin.as_bytes());
    hasher.update(b"|");
    hasher.update(nanos.to_be_bytes());
    hasher.update(salt.to_be_bytes());
    let digest = hasher.finalize();

    URL_SAFE_NO_PAD.encode(&digest[..16])
}

// ── ListSessions ─────────────────────────────────────────────────────────────

pub struct ListSessionsUseCase<S: SessionStore> {
    pub sessions: S,
}

impl<S: SessionStore> ListSessionsUseCase<S> {
    /// Active sessions ordered most-recent-activity-first. Index entries
    /// whose record already expired are dropped from the index on the way
    /// through (best-effort).
    pub async fn execute(&self, principal_id: &str) -> Result<Vec<DeviceSession>, AuthServiceError> {
        let device_ids = self.sessions.device_ids(principal_id).await?;
        if device_ids.is_empty() {
            return Ok(vec![]);
        }

        let records = self.sessions.fetch_sessions(principal_id, &device_ids).await?;
        let Reconciled { mut live, stale } = split_live(&device_ids, records);

        if !stale.is_empty() {
            if let Err(e) = self.sessions.prune_index(principal_id, &stale).await {
                tracing::warn!(error = %e, "failed to prune stale device index entries");
            }
        }

        live.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(live)
    }
}
