use notify_service::{
    geo::parse_point,
    models::webhook::{
        CommunityMessageRecord, MessageRecord, PrivateMessageRecord, RequestRecord, WebhookPayload,
    },
};
use serde_json::json;

/// Test: message envelope parses with an `lng` location key
#[test]
fn test_message_envelope_parses() {
    let payload: WebhookPayload<MessageRecord> = serde_json::from_value(json!({
        "type": "INSERT",
        "table": "message",
        "record": {
            "user_id": "user-1",
            "message": "hello out there",
            "location": { "lat": "12.97", "lng": "77.59" }
        },
        "schema": "public",
        "old_record": null
    }))
    .unwrap();

    assert_eq!(payload.event_type, "INSERT");
    assert_eq!(payload.record.user_id, "user-1");

    let location = payload.record.location.unwrap();
    let (lat, lon) = parse_point(&location).unwrap();
    assert!((lat - 12.97).abs() < 1e-9);
    assert!((lon - 77.59).abs() < 1e-9);
}

/// Test: profile-style `long` key and numeric values parse too
#[test]
fn test_location_key_variants() {
    let payload: WebhookPayload<MessageRecord> = serde_json::from_value(json!({
        "type": "INSERT",
        "table": "message",
        "record": {
            "user_id": "user-1",
            "message": "hi",
            "location": { "lat": 1.5, "long": -2.5 }
        },
        "schema": "public"
    }))
    .unwrap();

    let (lat, lon) = parse_point(&payload.record.location.unwrap()).unwrap();
    assert_eq!(lat, 1.5);
    assert_eq!(lon, -2.5);
}

/// Test: a missing location stays None rather than failing the envelope
#[test]
fn test_missing_location_is_none() {
    let payload: WebhookPayload<MessageRecord> = serde_json::from_value(json!({
        "type": "INSERT",
        "table": "message",
        "record": { "user_id": "user-1", "message": "hi", "location": null },
        "schema": "public"
    }))
    .unwrap();

    assert!(payload.record.location.is_none());
}

/// Test: community ids arrive as strings or bare numbers
#[test]
fn test_community_id_string_or_number() {
    let from_string: WebhookPayload<CommunityMessageRecord> = serde_json::from_value(json!({
        "type": "INSERT",
        "table": "community_message",
        "record": { "message": "meetup", "com_id": "  com-7  " },
        "schema": "public"
    }))
    .unwrap();
    assert_eq!(from_string.record.com_id, "com-7");

    let from_number: WebhookPayload<CommunityMessageRecord> = serde_json::from_value(json!({
        "type": "INSERT",
        "table": "community_message",
        "record": { "message": "meetup", "com_id": 7 },
        "schema": "public"
    }))
    .unwrap();
    assert_eq!(from_number.record.com_id, "7");
}

/// Test: private message record carries sender and chat id
#[test]
fn test_private_message_record_parses() {
    let payload: WebhookPayload<PrivateMessageRecord> = serde_json::from_value(json!({
        "type": "UPDATE",
        "table": "private_message",
        "record": { "message": "see you soon", "sent_by": "user-1", "chat_id": "chat-9" },
        "schema": "public",
        "old_record": { "message": "", "sent_by": "user-1", "chat_id": "chat-9" }
    }))
    .unwrap();

    assert_eq!(payload.record.sent_by, "user-1");
    assert_eq!(payload.record.chat_id, "chat-9");
}

/// Test: the request record's misspelled wire field maps to receiver_uid
#[test]
fn test_request_record_wire_field_name() {
    let payload: WebhookPayload<RequestRecord> = serde_json::from_value(json!({
        "type": "UPDATE",
        "table": "request",
        "record": {
            "status": "accept",
            "requested_uid": "user-1",
            "reciever_uid": "user-2"
        },
        "schema": "public"
    }))
    .unwrap();

    assert_eq!(payload.record.status, "accept");
    assert_eq!(payload.record.receiver_uid, "user-2");
}
