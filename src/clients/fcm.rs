use std::collections::HashMap;

use reqwest::Client;
use tracing::{debug, info};

use crate::{
    config::Config,
    error::DeliveryError,
    models::fcm::{FcmMessage, FcmNotification, FcmRequest},
};

pub struct FcmClient {
    http_client: Client,
    endpoint: String,
    project_id: String,
}

impl FcmClient {
    pub fn new(config: &Config, http_client: Client) -> Self {
        info!(project_id = %config.fcm_project_id, "FCM client initialized");

        Self {
            http_client,
            endpoint: config.fcm_endpoint.clone(),
            project_id: config.fcm_project_id.clone(),
        }
    }

    /// One push send. A gateway rejection is an error for this recipient
    /// only; the caller decides what to do with the rest of the batch.
    pub async fn send_notification(
        &self,
        access_token: &str,
        device_token: &str,
        title: &str,
        body: &str,
        data: Option<HashMap<String, String>>,
    ) -> Result<(), DeliveryError> {
        let request = FcmRequest {
            message: FcmMessage {
                token: device_token.to_string(),
                notification: FcmNotification {
                    title: title.to_string(),
                    body: body.to_string(),
                },
                data,
            },
        };

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| DeliveryError(format!("push request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            debug!("FCM push notification sent");
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(DeliveryError(format!(
                "push gateway returned {status}: {error_text}"
            )))
        }
    }
}
