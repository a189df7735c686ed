use serde_json::Value as JsonValue;
use tokio_postgres::{Client, NoTls, Row};
use tracing::{debug, error};

use crate::{
    error::DispatchError,
    models::profile::{Chat, Community, GeoPoint, Profile},
};

const PROFILE_COLUMNS: &str = "user_id::text, fcm_token, last_loc, range::text, name";

/// Read-only store access for one webhook invocation. Every invocation
/// opens its own connection; nothing is shared across events.
pub struct DatabaseClient {
    client: Client,
}

impl DatabaseClient {
    pub async fn connect(database_url: &str) -> Result<Self, DispatchError> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .map_err(|e| DispatchError::Lookup(format!("database connection failed: {e}")))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!(error = %e, "Database connection terminated");
            }
        });

        Ok(Self { client })
    }

    pub async fn fetch_community(&self, com_id: &str) -> Result<Community, DispatchError> {
        let rows = self
            .client
            .query(
                "SELECT com_id::text, title, location FROM community WHERE com_id::text = $1",
                &[&com_id],
            )
            .await
            .map_err(|e| DispatchError::Lookup(format!("community query failed: {e}")))?;

        match rows.as_slice() {
            [row] => community_from_row(row),
            [] => Err(DispatchError::Lookup(format!(
                "no community found with id {com_id}"
            ))),
            _ => Err(DispatchError::Lookup(format!(
                "multiple communities found with id {com_id}"
            ))),
        }
    }

    /// Broadcast candidate set: every profile, optionally without the sender.
    pub async fn fetch_profiles(
        &self,
        exclude_user_id: Option<&str>,
    ) -> Result<Vec<Profile>, DispatchError> {
        let rows = match exclude_user_id {
            Some(user_id) => {
                let query =
                    format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE user_id::text <> $1");
                self.client.query(query.as_str(), &[&user_id]).await
            }
            None => {
                let query = format!("SELECT {PROFILE_COLUMNS} FROM profile");
                self.client.query(query.as_str(), &[]).await
            }
        }
        .map_err(|e| DispatchError::Lookup(format!("profile query failed: {e}")))?;

        debug!(count = rows.len(), "Fetched candidate profiles");

        rows.iter().map(profile_from_row).collect()
    }

    /// Direct candidate set: profiles for an already-known id set.
    pub async fn fetch_profiles_by_ids(&self, ids: &[&str]) -> Result<Vec<Profile>, DispatchError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE user_id::text = ANY($1)");
        let rows = self
            .client
            .query(query.as_str(), &[&ids])
            .await
            .map_err(|e| DispatchError::Lookup(format!("profile query failed: {e}")))?;

        rows.iter().map(profile_from_row).collect()
    }

    /// Single-row profile lookup; zero or multiple rows is a hard error.
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Profile, DispatchError> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE user_id::text = $1");
        let rows = self
            .client
            .query(query.as_str(), &[&user_id])
            .await
            .map_err(|e| DispatchError::Lookup(format!("profile query failed: {e}")))?;

        match rows.as_slice() {
            [row] => profile_from_row(row),
            [] => Err(DispatchError::Lookup(format!(
                "no profile found for user {user_id}"
            ))),
            _ => Err(DispatchError::Lookup(format!(
                "multiple profiles found for user {user_id}"
            ))),
        }
    }

    pub async fn fetch_chat(&self, chat_id: &str) -> Result<Option<Chat>, DispatchError> {
        let row = self
            .client
            .query_opt(
                "SELECT id::text, uid_1::text, uid_2::text, is_active FROM chats WHERE id::text = $1",
                &[&chat_id],
            )
            .await
            .map_err(|e| DispatchError::Lookup(format!("chat query failed: {e}")))?;

        row.map(|row| chat_from_row(&row)).transpose()
    }

    pub async fn health_check(&self) -> Result<(), DispatchError> {
        self.client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| DispatchError::Lookup(format!("health check query failed: {e}")))?;

        Ok(())
    }
}

fn profile_from_row(row: &Row) -> Result<Profile, DispatchError> {
    // A location that does not decode is treated as absent so the filter
    // excludes the row instead of the whole event failing.
    let last_loc = row
        .try_get::<_, Option<JsonValue>>("last_loc")
        .map_err(column_error)?
        .and_then(|value| serde_json::from_value::<GeoPoint>(value).ok());

    Ok(Profile {
        user_id: row.try_get("user_id").map_err(column_error)?,
        fcm_token: row.try_get("fcm_token").map_err(column_error)?,
        last_loc,
        range: row.try_get("range").map_err(column_error)?,
        name: row.try_get("name").map_err(column_error)?,
    })
}

fn community_from_row(row: &Row) -> Result<Community, DispatchError> {
    let location = row
        .try_get::<_, Option<JsonValue>>("location")
        .map_err(column_error)?
        .and_then(|value| serde_json::from_value::<GeoPoint>(value).ok());

    Ok(Community {
        com_id: row.try_get("com_id").map_err(column_error)?,
        title: row.try_get("title").map_err(column_error)?,
        location,
    })
}

fn chat_from_row(row: &Row) -> Result<Chat, DispatchError> {
    Ok(Chat {
        id: row.try_get("id").map_err(column_error)?,
        uid_1: row.try_get("uid_1").map_err(column_error)?,
        uid_2: row.try_get("uid_2").map_err(column_error)?,
        is_active: row.try_get("is_active").map_err(column_error)?,
    })
}

fn column_error(e: tokio_postgres::Error) -> DispatchError {
    DispatchError::Lookup(format!("row decode failed: {e}"))
}
