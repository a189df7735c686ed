use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    pub token: String,
    pub notification: FcmNotification,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,
}

/// Successful body from the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,

    #[serde(default)]
    pub expires_in: Option<i64>,

    #[serde(default)]
    pub token_type: Option<String>,
}
