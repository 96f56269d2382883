use reqwest::StatusCode;

use crate::domain::repository::UserDirectory;
use crate::domain::types::Principal;
use crate::error::AuthServiceError;

/// Read-only principal lookup against the user directory service.
#[derive(Clone)]
pub struct HttpUserDirectory {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl UserDirectory for HttpUserDirectory {
    async fn find_by_id(&self, id: &str) -> Result<Option<Principal>, AuthServiceError> {
        let url = format!("{}/users/{}", self.base_url, id);
        let response = self.client.get(&url).send().await;
        match response {
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => Ok(None),
            Ok(resp) => {
                let resp = resp
                    .error_for_status()
                    .map_err(|e| anyhow::anyhow!("user directory get_user failed: {e}"))?;
                let principal = resp
                    .json::<Principal>()
                    .await
                    .map_err(|e| anyhow::anyhow!("user directory returned invalid body: {e}"))?;
                Ok(Some(principal))
            }
            Err(e) => Err(anyhow::anyhow!("user directory get_user failed: {e}").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, AuthServiceError> {
        let url = format!("{}/users", self.base_url);
        let response = self.client.get(&url).query(&[("email", email)]).send().await;
        match response {
            Ok(resp) if resp.status() == StatusCode::NOT_FOUND => Ok(None),
            Ok(resp) => {
                let resp = resp
                    .error_for_status()
                    .map_err(|e| anyhow::anyhow!("user directory get_user_by_email failed: {e}"))?;
                let principal = resp
                    .json::<Principal>()
                    .await
                    .map_err(|e| anyhow::anyhow!("user directory returned invalid body: {e}"))?;
                Ok(Some(principal))
            }
            Err(e) => Err(anyhow::anyhow!("user directory get_user_by_email failed: {e}").into()),
        }
    }
}
