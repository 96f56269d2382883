use crate::domain::repository::Notifier;
use crate::domain::types::OtpNotification;
use crate::error::AuthServiceError;

/// Fire-and-forget delivery through the notification service.
#[derive(Clone)]
pub struct HttpNotifier {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl Notifier for HttpNotifier {
    async fn send(
        &self,
        identifier: &str,
        notification: &OtpNotification,
    ) -> Result<(), AuthServiceError> {
        let url = format!("{}/notifications", self.base_url);
        let body = serde_json::json!({
            "recipient": identifier,
            "template": "otp_code",
            "payload": notification,
        });
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("notifier request failed: {e}"))?;
        response
            .error_for_status()
            .map_err(|e| anyhow::anyhow!("notifier rejected notification: {e}"))?;
        Ok(())
    }
}
