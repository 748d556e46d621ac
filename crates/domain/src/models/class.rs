use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a scheduled teaching session in the operational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassStatus {
    Scheduled,
    InProgress,
    Ended,
    Cancelled,
}

impl ClassStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in_progress",
            Self::Ended => "ended",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ClassStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "in_progress" => Ok(Self::InProgress),
            "ended" => Ok(Self::Ended),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::error::Error::Validation(format!(
                "unknown class status: {other}"
            ))),
        }
    }
}

/// A scheduled teaching session, as seen in the operational store.
///
/// The monitor only ever mutates `ai_triggered` and `updated_at`; every
/// other field belongs to upstream booking systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    pub class_id: String,
    pub status: ClassStatus,
    pub meeting_start: Option<DateTime<Utc>>,
    pub meeting_end: Option<DateTime<Utc>>,
    pub zoom_id: Option<String>,
    pub student_id: String,
    pub teacher_id: String,
    pub ai_triggered: bool,
    pub updated_at: DateTime<Utc>,
}

/// Minimal teacher record consulted by the monitor to enrich dispatch
/// payloads. A missing email is non-fatal — the field is simply omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub user_id: String,
    pub email: Option<String>,
}

/// Body posted to the external workflow webhook, and to `POST /v1/trigger`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPayload {
    pub user_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_email: Option<String>,
}

impl DispatchPayload {
    /// A stable idempotency key for one dispatch of one class. Reused across
    /// retries so the external side treats them as the same request.
    pub fn idempotency_key(&self) -> String {
        self.class_id.clone()
    }

    /// Short digest of the payload body, for logging permanent dispatch
    /// failures without writing student/teacher identifiers into the log
    /// line itself.
    pub fn payload_digest(&self) -> String {
        use sha2::{Digest, Sha256};

        let body = serde_json::to_vec(self).unwrap_or_default();
        let digest = Sha256::digest(&body);
        hex::encode(&digest[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> DispatchPayload {
        DispatchPayload {
            user_id: "s-1".to_string(),
            teacher_id: "t-1".to_string(),
            class_id: "c-1".to_string(),
            date: "2025-11-24".to_string(),
            start_time: "17:00".to_string(),
            end_time: "17:30".to_string(),
            teacher_email: Some("teacher@example.com".to_string()),
        }
    }

    #[test]
    fn idempotency_key_is_the_class_id() {
        assert_eq!(payload().idempotency_key(), "c-1");
    }

    #[test]
    fn payload_digest_is_deterministic() {
        assert_eq!(payload().payload_digest(), payload().payload_digest());
    }

    #[test]
    fn payload_digest_changes_with_payload() {
        let mut other = payload();
        other.class_id = "c-2".to_string();
        assert_ne!(payload().payload_digest(), other.payload_digest());
    }

    #[test]
    fn class_status_round_trips_through_str() {
        use std::str::FromStr;
        for status in ["scheduled", "in_progress", "ended", "cancelled"] {
            assert_eq!(ClassStatus::from_str(status).unwrap().as_str(), status);
        }
        assert!(ClassStatus::from_str("bogus").is_err());
    }
}
