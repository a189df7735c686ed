use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

use crate::models::profile::GeoPoint;

/// Envelope the database delivers to every webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload<R> {
    #[serde(rename = "type")]
    pub event_type: String,
    pub table: String,
    pub record: R,
    pub schema: String,

    #[serde(default)]
    pub old_record: Option<JsonValue>,
}

/// Location-tagged message insert (broadcast flow).
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRecord {
    pub user_id: String,
    pub message: String,
    pub location: Option<GeoPoint>,
}

/// Community message insert (broadcast flow around the community's location).
#[derive(Debug, Clone, Deserialize)]
pub struct CommunityMessageRecord {
    pub message: String,

    #[serde(deserialize_with = "lenient_string")]
    pub com_id: String,
}

/// Private chat message write (direct flow).
#[derive(Debug, Clone, Deserialize)]
pub struct PrivateMessageRecord {
    pub message: String,
    pub sent_by: String,

    #[serde(deserialize_with = "lenient_string")]
    pub chat_id: String,
}

/// Connection request status change (direct flow).
///
/// `reciever_uid` is the column name as it exists in the store; the typo is
/// part of the wire format.
#[derive(Debug, Clone, Deserialize)]
pub struct RequestRecord {
    pub status: String,
    pub requested_uid: String,

    #[serde(rename = "reciever_uid")]
    pub receiver_uid: String,
}

/// Identifiers arrive as strings or bare numbers depending on the trigger;
/// normalize both to a trimmed string.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = JsonValue::deserialize(deserializer)?;
    match value {
        JsonValue::String(s) => Ok(s.trim().to_string()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number identifier, got {other}"
        ))),
    }
}
