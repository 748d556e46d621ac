use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// State machine for [`TranscriptArtifact::status`].
///
/// ```text
///   pending ─▶ processing ─▶ awaiting_exercises ─▶ completed
///      ▲          │                │
///      │          ▼                ▼
///      └──── failed ◀────── failed (after max_retries)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStatus {
    Pending,
    Processing,
    AwaitingExercises,
    Completed,
    Failed,
}

impl TranscriptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::AwaitingExercises => "awaiting_exercises",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Statuses a claim query is allowed to pick up.
    pub fn is_claimable(self) -> bool {
        matches!(self, Self::Pending | Self::AwaitingExercises)
    }
}

impl std::str::FromStr for TranscriptStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "awaiting_exercises" => Ok(Self::AwaitingExercises),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(crate::error::Error::Validation(format!(
                "unknown transcript status: {other}"
            ))),
        }
    }
}

/// Provenance of the transcript text, for downstream quality weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    ZoomNative,
    ExternalStt,
    Unknown,
}

impl TranscriptSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ZoomNative => "zoom_native",
            Self::ExternalStt => "external_stt",
            Self::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for TranscriptSource {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zoom_native" => Ok(Self::ZoomNative),
            "external_stt" => Ok(Self::ExternalStt),
            "unknown" => Ok(Self::Unknown),
            other => Err(crate::error::Error::Validation(format!(
                "unknown transcript source: {other}"
            ))),
        }
    }
}

/// One lesson's transcript lifecycle row in the analytical store
/// (`zoom_summaries`). Business key is `(class_id, meeting_date, start_time)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptArtifact {
    pub summary_id: i64,
    pub user_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub teacher_email: Option<String>,
    pub meeting_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub transcript: Option<String>,
    pub transcript_length: i32,
    pub transcript_source: TranscriptSource,
    pub status: TranscriptStatus,
    pub processing_attempts: i32,
    pub last_error: Option<String>,
    pub claimed_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranscriptArtifact {
    pub fn transcript_too_short(&self, min_chars: usize) -> bool {
        match &self.transcript {
            None => true,
            Some(t) => t.trim().chars().count() < min_chars,
        }
    }
}
