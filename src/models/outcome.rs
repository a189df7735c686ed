use serde::Serialize;

use crate::models::profile::Profile;

/// A candidate that survived eligibility filtering, together with the
/// distance that admitted it (broadcast flows only).
#[derive(Debug, Clone)]
pub struct EligibleRecipient {
    pub profile: Profile,
    pub distance_meters: Option<f64>,
}

/// Result of one push attempt. Failures stay here; they never abort the
/// batch or the request.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationOutcome {
    pub recipient_id: String,
    pub delivered: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl NotificationOutcome {
    pub fn delivered(recipient_id: String) -> Self {
        Self {
            recipient_id,
            delivered: true,
            error_detail: None,
        }
    }

    pub fn failed(recipient_id: String, detail: String) -> Self {
        Self {
            recipient_id,
            delivered: false,
            error_detail: Some(detail),
        }
    }
}

/// Response body for a handled webhook.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchSummary {
    pub message: String,
    pub sent: usize,
    pub failed: usize,
}

impl DispatchSummary {
    pub fn from_outcomes(message: impl Into<String>, outcomes: &[NotificationOutcome]) -> Self {
        let sent = outcomes.iter().filter(|o| o.delivered).count();
        Self {
            message: message.into(),
            sent,
            failed: outcomes.len() - sent,
        }
    }

    /// Benign no-op: nothing was eligible, nothing was attempted.
    pub fn no_op(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sent: 0,
            failed: 0,
        }
    }
}
