use crate::domain::repository::{ChallengeStore, SessionStore, UserDirectory};
use crate::domain::types::ChallengePurpose;
use crate::error::AuthServiceError;

/// Fans revocation events out to the session registry and challenge store.
///
/// Session removal is the primary effect. Challenge cleanup and index
/// bookkeeping are best-effort: failures are retried once, then logged and
/// left to key TTLs.
pub struct RevocationCoordinator<S, C, U>
where
    S: SessionStore,
    C: ChallengeStore,
    U: UserDirectory,
{
    pub sessions: S,
    pub challenges: C,
    pub users: U,
}

impl<S, C, U> RevocationCoordinator<S, C, U>
where
    S: SessionStore,
    C: ChallengeStore,
    U: UserDirectory,
{
    /// Log out one device. Not-found is surfaced distinctly so an explicit
    /// per-device logout can 404.
    pub async fn on_logout(
        &self,
        principal_id: &str,
        device_id: &str,
    ) -> Result<(), AuthServiceError> {
        let removed = self.sessions.remove_device(principal_id, device_id).await?;
        if !removed {
            return Err(AuthServiceError::DeviceNotFound);
        }
        Ok(())
    }

    pub async fn on_logout_everywhere(&self, principal_id: &str) -> Result<(), AuthServiceError> {
        self.revoke_all(principal_id).await
    }

    /// A pre-change OTP must not stay redeemable after the password changes;
    /// both live on the same trust boundary.
    pub async fn on_password_changed(&self, principal_id: &str) -> Result<(), AuthServiceError> {
        self.cleanup_challenges(principal_id).await;
        self.revoke_all(principal_id).await
    }

    pub async fn on_account_deleted(&self, principal_id: &str) -> Result<(), AuthServiceError> {
        self.cleanup_challenges(principal_id).await;
        self.revoke_all(principal_id).await
    }

    async fn revoke_all(&self, principal_id: &str) -> Result<(), AuthServiceError> {
        let device_ids = self.sessions.device_ids(principal_id).await?;

        let mut failed = Vec::new();
        for device_id in &device_ids {
            if let Err(e) = self.sessions.remove_device(principal_id, device_id).await {
                tracing::warn!(error = %e, device_id = %device_id, "device removal failed, will retry");
                failed.push(device_id.clone());
            }
        }

        let mut unresolved = false;
        for device_id in &failed {
            if let Err(e) = self.sessions.remove_device(principal_id, device_id).await {
                tracing::warn!(error = %e, device_id = %device_id, "device removal failed twice, leaving indexed");
                unresolved = true;
            }
        }

        // Devices that would not die stay in the index so their credentials
        // remain visible to a later pass.
        if !unresolved {
            self.sessions.clear_index(principal_id).await?;
        }
        Ok(())
    }

    async fn cleanup_challenges(&self, principal_id: &str) {
        let email = match self.users.find_by_id(principal_id).await {
            Ok(Some(principal)) => principal.email,
            Ok(None) => {
                // Directory record already gone; outstanding challenges age
                // out via TTL instead.
                tracing::warn!(
                    principal_id = %principal_id,
                    "principal not found during challenge cleanup"
                );
                return;
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    principal_id = %principal_id,
                    "directory lookup failed during challenge cleanup"
                );
                return;
            }
        };

        // Cooldown markers are left alone: they are rate-limit state, not
        // grants.
        for purpose in ChallengePurpose::ALL {
            if self.challenges.delete(purpose, &email).await.is_err() {
                if let Err(e) = self.challenges.delete(purpose, &email).await {
                    tracing::warn!(
                        error = %e,
                        purpose = purpose.as_str(),
                        "challenge cleanup failed twice"
                    );
                }
            }
        }
    }
}
