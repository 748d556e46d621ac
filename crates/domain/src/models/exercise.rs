use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether an exercise item was produced by the LLM path or the
/// deterministic heuristic fallback. Surfaced per-type in `metadata`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSource {
    Llm,
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeType {
    Grammar,
    Vocabulary,
    Spelling,
    Unknown,
}

/// A teacher-correction pair mined from the transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mistake {
    pub incorrect: String,
    pub correct: String,
    #[serde(rename = "type")]
    pub kind: MistakeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    pub example_sentence: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClozeExercise {
    /// The sentence with one token replaced by a blank marker (`____`).
    pub sentence_with_blank: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrammarExercise {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceBuilderExercise {
    pub english_sentence: String,
    pub sentence_tokens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distractors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ExerciseCounts {
    pub flashcards: usize,
    pub cloze: usize,
    pub grammar: usize,
    pub sentence: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseMetadata {
    pub quality_passed: bool,
    pub quality_score: u8,
    pub vocabulary_count: usize,
    pub sentences_count: usize,
    pub translation_present: bool,
    pub flashcards_source: ExerciseSource,
    pub cloze_source: ExerciseSource,
    pub grammar_source: ExerciseSource,
    pub sentence_source: ExerciseSource,
}

/// The four typed exercise arrays produced for one transcript, plus the
/// counts and quality metadata that accompany them. Persisted verbatim as
/// the `exercises` JSON document on `lesson_exercises`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExercisesDocument {
    pub flashcards: Vec<Flashcard>,
    pub cloze: Vec<ClozeExercise>,
    pub grammar: Vec<GrammarExercise>,
    pub sentence: Vec<SentenceBuilderExercise>,
    pub counts: ExerciseCounts,
    pub metadata: ExerciseMetadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseSetStatus {
    PendingApproval,
    Approved,
    Rejected,
}

impl ExerciseSetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::str::FromStr for ExerciseSetStatus {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_approval" => Ok(Self::PendingApproval),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(crate::error::Error::Validation(format!(
                "unknown exercise set status: {other}"
            ))),
        }
    }
}

/// The generated bundle of exercises for one [`TranscriptArtifact`]
/// (`lesson_exercises`). Immutable once created except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: Uuid,
    pub summary_id: i64,
    pub user_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub generated_at: DateTime<Utc>,
    pub exercises: ExercisesDocument,
    pub status: ExerciseSetStatus,
}
