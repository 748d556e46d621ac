use chrono::{DateTime, Utc};
use ll_domain::error::{Error, Result};
use ll_domain::models::{Class, ClassStatus, Teacher};
use sqlx::postgres::PgPool;
use sqlx::{FromRow, Row};
use tracing::instrument;

#[derive(Debug, FromRow)]
struct ClassRow {
    class_id: String,
    status: String,
    meeting_start: Option<DateTime<Utc>>,
    meeting_end: Option<DateTime<Utc>>,
    zoom_id: Option<String>,
    student_id: String,
    teacher_id: String,
    ai_triggered: bool,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ClassRow> for Class {
    type Error = Error;

    fn try_from(row: ClassRow) -> Result<Self> {
        Ok(Self {
            class_id: row.class_id,
            status: row.status.parse::<ClassStatus>()?,
            meeting_start: row.meeting_start,
            meeting_end: row.meeting_end,
            zoom_id: row.zoom_id,
            student_id: row.student_id,
            teacher_id: row.teacher_id,
            ai_triggered: row.ai_triggered,
            updated_at: row.updated_at,
        })
    }
}

/// Gateway to the relational store of record for classes and teachers.
///
/// The monitor is the only writer here, and it only ever touches
/// `ai_triggered` and `updated_at` — every other column belongs to
/// upstream booking systems and is read-only from this crate's perspective.
#[derive(Clone)]
pub struct OperationalStore {
    pool: PgPool,
}

impl OperationalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(dsn: &str) -> Result<Self> {
        Ok(Self::new(crate::pool::connect(dsn).await?))
    }

    /// Snapshot query backing one monitor tick: ended classes that have
    /// never been dispatched, oldest `meeting_end` first.
    #[instrument(skip(self), name = "db_ended_undispatched_classes")]
    pub async fn ended_undispatched_classes(&self, batch_size: i64) -> Result<Vec<Class>> {
        let rows: Vec<ClassRow> = sqlx::query_as(
            "SELECT class_id, status, meeting_start, meeting_end, zoom_id,
                    student_id, teacher_id, ai_triggered, updated_at
             FROM classes
             WHERE status = 'ended'
               AND meeting_end IS NOT NULL
               AND (ai_triggered IS NULL OR ai_triggered = false)
             ORDER BY meeting_end ASC
             LIMIT $1",
        )
        .bind(batch_size)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("ended_undispatched_classes: {e}")))?;

        rows.into_iter().map(Class::try_from).collect()
    }

    #[instrument(skip(self), name = "db_lookup_teacher")]
    pub async fn lookup_teacher(&self, teacher_id: &str) -> Result<Option<Teacher>> {
        let row = sqlx::query("SELECT user_id, email FROM users WHERE user_id = $1")
            .bind(teacher_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Error::Store(format!("lookup_teacher: {e}")))?;

        Ok(row.map(|r| Teacher {
            user_id: r.get("user_id"),
            email: r.get("email"),
        }))
    }

    /// Conditionally flips `ai_triggered` for one class. Returns `true` iff
    /// this call won the race — the only inter-monitor synchronization
    /// primitive in the system.
    #[instrument(skip(self), fields(class_id = %class_id), name = "db_mark_dispatched")]
    pub async fn mark_dispatched(&self, class_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE classes
             SET ai_triggered = true, updated_at = now()
             WHERE class_id = $1 AND (ai_triggered IS NULL OR ai_triggered = false)",
        )
        .bind(class_id)
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Store(format!("mark_dispatched: {e}")))?;

        Ok(result.rows_affected() == 1)
    }
}
