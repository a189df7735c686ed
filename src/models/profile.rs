use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A coordinate pair as stored in the database.
///
/// Values are kept as raw JSON because the store holds them as strings in
/// some rows and numbers in others; parsing to `f64` happens at filter time
/// and a malformed value excludes the row rather than failing the event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: JsonValue,

    #[serde(alias = "long", alias = "lng")]
    pub lon: JsonValue,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub fcm_token: Option<String>,
    pub last_loc: Option<GeoPoint>,
    pub range: Option<String>,
    pub name: Option<String>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.user_id)
    }

    pub fn has_push_token(&self) -> bool {
        self.fcm_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Community {
    pub com_id: String,
    pub title: String,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: String,
    pub uid_1: String,
    pub uid_2: String,
    pub is_active: bool,
}

impl Chat {
    /// The participant on the other side of the conversation from `sender_id`.
    pub fn counterpart_of(&self, sender_id: &str) -> &str {
        if self.uid_1 == sender_id {
            &self.uid_2
        } else {
            &self.uid_1
        }
    }
}
