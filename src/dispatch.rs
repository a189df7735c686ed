use std::collections::HashMap;

use tracing::{info, warn};

use crate::{
    clients::{auth::TokenIssuer, database::DatabaseClient, fcm::FcmClient},
    error::DispatchError,
    geo,
    models::{
        outcome::{DispatchSummary, EligibleRecipient, NotificationOutcome},
        profile::Profile,
        webhook::{
            CommunityMessageRecord, MessageRecord, PrivateMessageRecord, RequestRecord,
            WebhookPayload,
        },
    },
};

/// Title/body pair plus optional structured data attached to every push in
/// one fan-out.
pub struct PushContent {
    pub title: String,
    pub body: String,
    pub data: Option<HashMap<String, String>>,
}

/// Location-tagged message insert: geofenced broadcast excluding the sender.
pub async fn handle_message(
    db: &DatabaseClient,
    issuer: &TokenIssuer,
    fcm: &FcmClient,
    payload: WebhookPayload<MessageRecord>,
) -> Result<DispatchSummary, DispatchError> {
    let record = payload.record;
    info!(
        table = %payload.table,
        sender = %record.user_id,
        "Processing message event"
    );

    let location = record
        .location
        .ok_or_else(|| DispatchError::Validation("message has no location data".to_string()))?;
    let (lat, lon) = geo::parse_point(&location)
        .ok_or_else(|| DispatchError::Validation("message location is malformed".to_string()))?;

    let candidates = db.fetch_profiles(Some(&record.user_id)).await?;
    let recipients = geo::filter_in_range(lat, lon, candidates);
    info!(count = recipients.len(), "Nearby recipients resolved");

    let content = PushContent {
        title: "Nearby Message".to_string(),
        body: record.message,
        data: None,
    };

    deliver_all(
        issuer,
        fcm,
        &recipients,
        &content,
        "Notifications sent.",
        "No nearby users found.",
    )
    .await
}

/// Community message insert: geofenced broadcast around the community's
/// own location.
pub async fn handle_community_message(
    db: &DatabaseClient,
    issuer: &TokenIssuer,
    fcm: &FcmClient,
    payload: WebhookPayload<CommunityMessageRecord>,
) -> Result<DispatchSummary, DispatchError> {
    let record = payload.record;
    info!(
        table = %payload.table,
        com_id = %record.com_id,
        "Processing community message event"
    );

    let community = db.fetch_community(&record.com_id).await?;

    let location = community.location.as_ref().ok_or_else(|| {
        DispatchError::Validation(format!(
            "community {} has no location data",
            community.com_id
        ))
    })?;
    let (lat, lon) = geo::parse_point(location).ok_or_else(|| {
        DispatchError::Validation(format!(
            "community {} location is malformed",
            community.com_id
        ))
    })?;

    let candidates = db.fetch_profiles(None).await?;
    let recipients = geo::filter_in_range(lat, lon, candidates);
    info!(count = recipients.len(), "Nearby recipients resolved");

    let content = PushContent {
        title: format!("New Message from {} Community", community.title),
        body: record.message,
        data: Some(HashMap::from([
            ("tag".to_string(), "community".to_string()),
            ("id".to_string(), record.com_id.clone()),
        ])),
    };

    deliver_all(
        issuer,
        fcm,
        &recipients,
        &content,
        "Notifications sent.",
        "No nearby users found.",
    )
    .await
}

/// Private chat message: notify the counterpart, no distance filter.
pub async fn handle_private_message(
    db: &DatabaseClient,
    issuer: &TokenIssuer,
    fcm: &FcmClient,
    payload: WebhookPayload<PrivateMessageRecord>,
) -> Result<DispatchSummary, DispatchError> {
    let record = payload.record;
    info!(
        table = %payload.table,
        chat_id = %record.chat_id,
        sender = %record.sent_by,
        "Processing private message event"
    );

    let chat = db
        .fetch_chat(&record.chat_id)
        .await?
        .ok_or_else(|| DispatchError::Validation("chat not found".to_string()))?;

    if !chat.is_active {
        return Ok(DispatchSummary::no_op("Chat is not active"));
    }

    let counterpart_id = chat.counterpart_of(&record.sent_by).to_string();
    let profiles = db
        .fetch_profiles_by_ids(&[record.sent_by.as_str(), counterpart_id.as_str()])
        .await?;
    let (sender, receiver) = pair_profiles(&profiles, &record.sent_by, &counterpart_id)?;

    let content = PushContent {
        title: format!("{} Sent you a Message", sender.display_name()),
        body: record.message,
        data: None,
    };

    let mut recipients = Vec::new();
    if receiver.has_push_token() {
        recipients.push(EligibleRecipient {
            profile: receiver.clone(),
            distance_meters: None,
        });
    }

    deliver_all(
        issuer,
        fcm,
        &recipients,
        &content,
        "Notification sent.",
        "No FCM token for receiver",
    )
    .await
}

/// Connection request status change: notify the requester when the
/// counterpart accepted.
pub async fn handle_request_accept(
    db: &DatabaseClient,
    issuer: &TokenIssuer,
    fcm: &FcmClient,
    payload: WebhookPayload<RequestRecord>,
) -> Result<DispatchSummary, DispatchError> {
    let record = payload.record;
    info!(
        table = %payload.table,
        status = %record.status,
        requester = %record.requested_uid,
        "Processing request status event"
    );

    if record.status != "accept" {
        return Ok(DispatchSummary::no_op("Request not accepted; nothing to send."));
    }

    let requester = db.fetch_profile(&record.requested_uid).await?;
    let receiver = db.fetch_profile(&record.receiver_uid).await?;

    let content = PushContent {
        title: "Request Accepted".to_string(),
        body: format!(
            "Your Request has been accepted by {}",
            receiver.display_name()
        ),
        data: None,
    };

    let mut recipients = Vec::new();
    if requester.has_push_token() {
        recipients.push(EligibleRecipient {
            profile: requester,
            distance_meters: None,
        });
    }

    deliver_all(
        issuer,
        fcm,
        &recipients,
        &content,
        "Notification sent.",
        "No FCM token for requester",
    )
    .await
}

/// Pick the sender and counterpart out of a direct-pair lookup. Anything
/// other than exactly one row per participant is a hard error.
pub fn pair_profiles<'a>(
    profiles: &'a [Profile],
    sender_id: &str,
    counterpart_id: &str,
) -> Result<(&'a Profile, &'a Profile), DispatchError> {
    if profiles.len() != 2 {
        return Err(DispatchError::Lookup(format!(
            "expected 2 chat participant profiles, found {}",
            profiles.len()
        )));
    }

    let sender = profiles
        .iter()
        .find(|p| p.user_id == sender_id)
        .ok_or_else(|| DispatchError::Lookup("sender profile not found".to_string()))?;
    let receiver = profiles
        .iter()
        .find(|p| p.user_id == counterpart_id)
        .ok_or_else(|| DispatchError::Lookup("receiver profile not found".to_string()))?;

    Ok((sender, receiver))
}

/// Token exchange plus fan-out for one event. An empty recipient set is a
/// benign no-op that never touches the token issuer.
pub async fn deliver_all(
    issuer: &TokenIssuer,
    fcm: &FcmClient,
    recipients: &[EligibleRecipient],
    content: &PushContent,
    success_message: &str,
    empty_message: &str,
) -> Result<DispatchSummary, DispatchError> {
    if recipients.is_empty() {
        return Ok(DispatchSummary::no_op(empty_message));
    }

    let access_token = issuer.access_token().await?;
    let outcomes = fan_out(fcm, &access_token, recipients, content).await;
    Ok(DispatchSummary::from_outcomes(success_message, &outcomes))
}

/// One push per recipient, strictly sequential. A failed send records a
/// failed outcome for that recipient and the batch continues. Every
/// recipient handed in gets exactly one outcome.
pub async fn fan_out(
    fcm: &FcmClient,
    access_token: &str,
    recipients: &[EligibleRecipient],
    content: &PushContent,
) -> Vec<NotificationOutcome> {
    let mut outcomes = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let profile = &recipient.profile;
        let Some(device_token) = profile.fcm_token.as_deref() else {
            // Unreachable through the eligibility filters, but the
            // one-outcome-per-recipient invariant holds regardless.
            outcomes.push(NotificationOutcome::failed(
                profile.user_id.clone(),
                "recipient has no push token".to_string(),
            ));
            continue;
        };

        match fcm
            .send_notification(
                access_token,
                device_token,
                &content.title,
                &content.body,
                content.data.clone(),
            )
            .await
        {
            Ok(()) => {
                info!(
                    user = %profile.display_name(),
                    distance_meters = recipient.distance_meters,
                    "Notification sent"
                );
                outcomes.push(NotificationOutcome::delivered(profile.user_id.clone()));
            }
            Err(e) => {
                warn!(
                    user = %profile.display_name(),
                    error = %e,
                    "Notification delivery failed"
                );
                outcomes.push(NotificationOutcome::failed(
                    profile.user_id.clone(),
                    e.to_string(),
                ));
            }
        }
    }

    outcomes
}
