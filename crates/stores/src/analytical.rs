use chrono::{DateTime, NaiveDate, Utc};
use ll_domain::error::{Error, Result};
use ll_domain::models::{
    ExerciseSet, ExerciseSetStatus, ExercisesDocument, TranscriptArtifact, TranscriptSource,
    TranscriptStatus,
};
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct TranscriptArtifactRow {
    summary_id: i64,
    user_id: String,
    teacher_id: String,
    class_id: String,
    teacher_email: Option<String>,
    meeting_date: NaiveDate,
    start_time: String,
    end_time: String,
    transcript: Option<String>,
    transcript_length: i32,
    transcript_source: String,
    status: String,
    processing_attempts: i32,
    last_error: Option<String>,
    claimed_at: Option<DateTime<Utc>>,
    processed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TranscriptArtifactRow> for TranscriptArtifact {
    type Error = Error;

    fn try_from(row: TranscriptArtifactRow) -> Result<Self> {
        Ok(Self {
            summary_id: row.summary_id,
            user_id: row.user_id,
            teacher_id: row.teacher_id,
            class_id: row.class_id,
            teacher_email: row.teacher_email,
            meeting_date: row.meeting_date,
            start_time: row.start_time,
            end_time: row.end_time,
            transcript: row.transcript,
            transcript_length: row.transcript_length,
            transcript_source: row.transcript_source.parse()?,
            status: row.status.parse()?,
            processing_attempts: row.processing_attempts,
            last_error: row.last_error,
            claimed_at: row.claimed_at,
            processed_at: row.processed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct ExerciseSetRow {
    id: Uuid,
    summary_id: i64,
    user_id: String,
    teacher_id: String,
    class_id: String,
    generated_at: DateTime<Utc>,
    exercises: String,
    status: String,
}

impl TryFrom<ExerciseSetRow> for ExerciseSet {
    type Error = Error;

    fn try_from(row: ExerciseSetRow) -> Result<Self> {
        let exercises: ExercisesDocument = serde_json::from_str(&row.exercises)?;
        Ok(Self {
            id: row.id,
            summary_id: row.summary_id,
            user_id: row.user_id,
            teacher_id: row.teacher_id,
            class_id: row.class_id,
            generated_at: row.generated_at,
            exercises,
            status: row.status.parse()?,
        })
    }
}

/// New-artifact request for [`AnalyticalStore::find_or_insert_pending`].
pub struct NewArtifact {
    pub user_id: String,
    pub teacher_id: String,
    pub class_id: String,
    pub teacher_email: Option<String>,
    pub meeting_date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

/// Gateway to the document/JSON-column store holding transcript lifecycle
/// rows and generated exercise sets. Owns all writes to `zoom_summaries`
/// once a row exists, and is the only writer of `lesson_exercises`.
#[derive(Clone)]
pub struct AnalyticalStore {
    pool: PgPool,
}

impl AnalyticalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `key` is accepted for parity with hosted analytical backends that
    /// authenticate via a bearer credential rather than DSN userinfo; this
    /// adapter targets a Postgres-compatible endpoint and does not need it
    /// beyond logging which auth mode was configured.
    pub async fn connect(url: &str, key: Option<&str>) -> Result<Self> {
        if key.is_some() {
            tracing::debug!("analytical store configured with a bearer credential");
        }
        Ok(Self::new(crate::pool::connect(url).await?))
    }

    #[instrument(skip(self), name = "db_get_transcript_artifact")]
    pub async fn get_by_summary_id(&self, summary_id: i64) -> Result<Option<TranscriptArtifact>> {
        let row: Option<TranscriptArtifactRow> = sqlx::query_as(
            "SELECT summary_id, user_id, teacher_id, class_id, teacher_email, meeting_date,
                    start_time, end_time, transcript, transcript_length, transcript_source,
                    status, processing_attempts, last_error, claimed_at, processed_at,
                    created_at, updated_at
             FROM zoom_summaries WHERE summary_id = $1",
        )
        .bind(summary_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("get_by_summary_id: {e}")))?;

        row.map(TranscriptArtifact::try_from).transpose()
    }

    #[instrument(skip(self), name = "db_find_by_business_key")]
    pub async fn find_by_business_key(
        &self,
        class_id: &str,
        meeting_date: NaiveDate,
        start_time: &str,
    ) -> Result<Option<TranscriptArtifact>> {
        let row: Option<TranscriptArtifactRow> = sqlx::query_as(
            "SELECT summary_id, user_id, teacher_id, class_id, teacher_email, meeting_date,
                    start_time, end_time, transcript, transcript_length, transcript_source,
                    status, processing_attempts, last_error, claimed_at, processed_at,
                    created_at, updated_at
             FROM zoom_summaries
             WHERE class_id = $1 AND meeting_date = $2 AND start_time = $3",
        )
        .bind(class_id)
        .bind(meeting_date)
        .bind(start_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("find_by_business_key: {e}")))?;

        row.map(TranscriptArtifact::try_from).transpose()
    }

    /// Idempotent insert keyed on `(class_id, meeting_date, start_time)`:
    /// returns the existing row untouched if present, otherwise inserts a
    /// fresh `pending` artifact. Never creates a second row for one key.
    #[instrument(skip(self, new), fields(class_id = %new.class_id), name = "db_find_or_insert_pending")]
    pub async fn find_or_insert_pending(&self, new: NewArtifact) -> Result<(TranscriptArtifact, bool)> {
        if let Some(existing) = self
            .find_by_business_key(&new.class_id, new.meeting_date, &new.start_time)
            .await?
        {
            return Ok((existing, false));
        }

        let row: TranscriptArtifactRow = sqlx::query_as(
            "INSERT INTO zoom_summaries (
                user_id, teacher_id, class_id, teacher_email, meeting_date, start_time, end_time,
                transcript, transcript_length, transcript_source, status, processing_attempts,
                last_error, claimed_at, processed_at, created_at, updated_at
             ) VALUES (
                $1, $2, $3, $4, $5, $6, $7,
                NULL, 0, 'unknown', 'pending', 0,
                NULL, NULL, NULL, now(), now()
             )
             ON CONFLICT (class_id, meeting_date, start_time) DO UPDATE SET updated_at = zoom_summaries.updated_at
             RETURNING summary_id, user_id, teacher_id, class_id, teacher_email, meeting_date,
                       start_time, end_time, transcript, transcript_length, transcript_source,
                       status, processing_attempts, last_error, claimed_at, processed_at,
                       created_at, updated_at",
        )
        .bind(&new.user_id)
        .bind(&new.teacher_id)
        .bind(&new.class_id)
        .bind(&new.teacher_email)
        .bind(new.meeting_date)
        .bind(&new.start_time)
        .bind(&new.end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("find_or_insert_pending: {e}")))?;

        Ok((TranscriptArtifact::try_from(row)?, true))
    }

    /// Read-only candidate scan for one worker tick. Actual ownership is
    /// decided per-row by [`Self::try_claim`]; this only narrows the set.
    #[instrument(skip(self), name = "db_claim_candidates")]
    pub async fn claim_candidates(
        &self,
        batch_size: i64,
        lease_seconds: i64,
    ) -> Result<Vec<TranscriptArtifact>> {
        let rows: Vec<TranscriptArtifactRow> = sqlx::query_as(
            "SELECT summary_id, user_id, teacher_id, class_id, teacher_email, meeting_date,
                    start_time, end_time, transcript, transcript_length, transcript_source,
                    status, processing_attempts, last_error, claimed_at, processed_at,
                    created_at, updated_at
             FROM zoom_summaries
             WHERE status IN ('pending', 'awaiting_exercises')
               AND (claimed_at IS NULL OR claimed_at < now() - make_interval(secs => $2))
             ORDER BY created_at ASC
             LIMIT $1",
        )
        .bind(batch_size)
        .bind(lease_seconds as f64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("claim_candidates: {e}")))?;

        rows.into_iter().map(TranscriptArtifact::try_from).collect()
    }

    /// Atomic claim: transitions to `processing`, bumps the attempt count,
    /// and stamps `claimed_at`, but only if the row's status and
    /// `claimed_at` still match what the caller observed when scanning.
    /// Returns `None` if another worker won the race first.
    #[instrument(skip(self, expected_claimed_at), fields(summary_id), name = "db_try_claim")]
    pub async fn try_claim(
        &self,
        summary_id: i64,
        expected_status: TranscriptStatus,
        expected_claimed_at: Option<DateTime<Utc>>,
    ) -> Result<Option<TranscriptArtifact>> {
        let row: Option<TranscriptArtifactRow> = sqlx::query_as(
            "UPDATE zoom_summaries
             SET status = 'processing', processing_attempts = processing_attempts + 1,
                 claimed_at = now(), updated_at = now()
             WHERE summary_id = $1
               AND status = $2
               AND claimed_at IS NOT DISTINCT FROM $3
             RETURNING summary_id, user_id, teacher_id, class_id, teacher_email, meeting_date,
                       start_time, end_time, transcript, transcript_length, transcript_source,
                       status, processing_attempts, last_error, claimed_at, processed_at,
                       created_at, updated_at",
        )
        .bind(summary_id)
        .bind(expected_status.as_str())
        .bind(expected_claimed_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("try_claim: {e}")))?;

        row.map(TranscriptArtifact::try_from).transpose()
    }

    /// Terminal rejection before the engine is ever invoked (missing or
    /// too-short transcript, or any other data-validity fault).
    #[instrument(skip(self, last_error), name = "db_mark_failed")]
    pub async fn mark_failed(&self, summary_id: i64, last_error: &str) -> Result<()> {
        sqlx::query(
            "UPDATE zoom_summaries
             SET status = 'failed', last_error = $2, claimed_at = NULL, updated_at = now()
             WHERE summary_id = $1",
        )
        .bind(summary_id)
        .bind(last_error)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("mark_failed: {e}")))?;
        Ok(())
    }

    /// Returns a row that failed mid-processing back to the queue: either
    /// `awaiting_exercises` for another attempt, or `failed` once
    /// `max_retries` is exhausted.
    #[instrument(skip(self, last_error), name = "db_return_to_queue")]
    pub async fn return_to_queue(
        &self,
        summary_id: i64,
        processing_attempts: i32,
        max_retries: u32,
        last_error: &str,
    ) -> Result<bool> {
        let terminal = processing_attempts as u32 >= max_retries;
        let next_status = if terminal { "failed" } else { "awaiting_exercises" };

        sqlx::query(
            "UPDATE zoom_summaries
             SET status = $2, last_error = $3, claimed_at = NULL, updated_at = now()
             WHERE summary_id = $1",
        )
        .bind(summary_id)
        .bind(next_status)
        .bind(last_error)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("return_to_queue: {e}")))?;

        Ok(terminal)
    }

    /// Single logical write completing a successful generation: inserts the
    /// exercise set and advances the artifact to `completed` in one
    /// transaction, so no partial state is ever observable.
    #[instrument(skip(self, exercise_set), fields(summary_id = exercise_set.summary_id), name = "db_complete_with_exercise_set")]
    pub async fn complete_with_exercise_set(&self, exercise_set: &ExerciseSet) -> Result<()> {
        let exercises_json = serde_json::to_string(&exercise_set.exercises)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| Error::Store(format!("complete_with_exercise_set/begin: {e}")))?;

        sqlx::query(
            "INSERT INTO lesson_exercises (
                id, summary_id, user_id, teacher_id, class_id, generated_at, exercises, status
             ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(exercise_set.id)
        .bind(exercise_set.summary_id)
        .bind(&exercise_set.user_id)
        .bind(&exercise_set.teacher_id)
        .bind(&exercise_set.class_id)
        .bind(exercise_set.generated_at)
        .bind(&exercises_json)
        .bind(exercise_set.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Store(format!("complete_with_exercise_set/insert: {e}")))?;

        sqlx::query(
            "UPDATE zoom_summaries
             SET status = 'completed', processed_at = now(), claimed_at = NULL, updated_at = now()
             WHERE summary_id = $1",
        )
        .bind(exercise_set.summary_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Error::Store(format!("complete_with_exercise_set/update: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| Error::Store(format!("complete_with_exercise_set/commit: {e}")))?;

        Ok(())
    }

    #[instrument(skip(self), name = "db_exercise_set_for_summary")]
    pub async fn exercise_set_for_summary(&self, summary_id: i64) -> Result<Option<ExerciseSet>> {
        let row: Option<ExerciseSetRow> = sqlx::query_as(
            "SELECT id, summary_id, user_id, teacher_id, class_id, generated_at, exercises, status
             FROM lesson_exercises
             WHERE summary_id = $1 AND status != 'rejected'
             ORDER BY generated_at DESC
             LIMIT 1",
        )
        .bind(summary_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("exercise_set_for_summary: {e}")))?;

        row.map(ExerciseSet::try_from).transpose()
    }

    /// Read path backing `GET /v1/exercises`. `user_id` is an optional
    /// narrowing filter.
    #[instrument(skip(self), name = "db_exercise_sets_for_class")]
    pub async fn exercise_sets_for_class(
        &self,
        class_id: &str,
        user_id: Option<&str>,
    ) -> Result<Vec<ExerciseSet>> {
        let rows: Vec<ExerciseSetRow> = sqlx::query_as(
            "SELECT id, summary_id, user_id, teacher_id, class_id, generated_at, exercises, status
             FROM lesson_exercises
             WHERE class_id = $1 AND ($2::text IS NULL OR user_id = $2)
             ORDER BY generated_at DESC",
        )
        .bind(class_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("exercise_sets_for_class: {e}")))?;

        rows.into_iter().map(ExerciseSet::try_from).collect()
    }

    /// Persists a fetched transcript and advances a `pending` row to
    /// `awaiting_exercises`, used only when a transcript-fetch capability
    /// is configured ahead of engine invocation.
    #[instrument(skip(self, transcript), name = "db_attach_transcript")]
    pub async fn attach_transcript(
        &self,
        summary_id: i64,
        transcript: &str,
        source: TranscriptSource,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE zoom_summaries
             SET transcript = $2, transcript_length = $3, transcript_source = $4,
                 status = 'awaiting_exercises', updated_at = now()
             WHERE summary_id = $1",
        )
        .bind(summary_id)
        .bind(transcript)
        .bind(transcript.chars().count() as i32)
        .bind(source.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("attach_transcript: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_set_status_never_filters_out_unambiguous_values() {
        assert_eq!(ExerciseSetStatus::Approved.as_str(), "approved");
    }
}
