use std::time::Duration;

use chrono::Utc;
use ll_domain::models::{ExerciseSet, ExerciseSetStatus, TranscriptArtifact};
use ll_domain::trace::TraceEvent;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::state::AppState;

const MIN_TRANSCRIPT_CHARS: usize = 100;

/// Runs the transcript worker loop until `shutdown` is cancelled: claims
/// candidate rows from the analytical store one at a time, runs the
/// exercise engine under a soft deadline, and persists the result. A tick
/// already in flight when shutdown is requested gets up to
/// `shutdown_grace_seconds` to finish before it is abandoned — any row left
/// claimed past its lease is picked up again by another worker.
pub async fn run(state: AppState, shutdown: CancellationToken) {
    let worker_id = Uuid::new_v4().to_string();
    let mut interval = tokio::time::interval(Duration::from_secs(
        state.config.worker_poll_interval_seconds,
    ));
    let grace = Duration::from_secs(state.config.shutdown_grace_seconds);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("transcript worker stopping: shutdown requested");
                break;
            }
        }

        let work = tick(&state, &worker_id);
        tokio::pin!(work);

        tokio::select! {
            _ = &mut work => {}
            _ = shutdown.cancelled() => {
                tracing::warn!("shutdown requested mid-tick, waiting up to shutdown_grace_seconds to finish");
                if tokio::time::timeout(grace, work).await.is_err() {
                    tracing::warn!("transcript worker tick abandoned: exceeded shutdown grace period");
                }
                break;
            }
        }

        if shutdown.is_cancelled() {
            tracing::info!("transcript worker stopping: shutdown requested");
            break;
        }
    }
}

async fn tick(state: &AppState, worker_id: &str) {
    let batch_size = state.config.worker_batch_size as i64;
    let lease_seconds = state.config.worker_lease_seconds as i64;

    let candidates = match state.analytical.claim_candidates(batch_size, lease_seconds).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::warn!(error = %e, "failed to scan for claimable transcripts");
            return;
        }
    };

    for candidate in candidates {
        let summary_id = candidate.summary_id;
        let was_leased = candidate.claimed_at.is_some();

        let claimed = state
            .analytical
            .try_claim(summary_id, candidate.status, candidate.claimed_at)
            .await;

        let artifact = match claimed {
            Ok(Some(artifact)) => {
                if was_leased {
                    TraceEvent::LeaseReclaimed {
                        summary_id: artifact.summary_id,
                        worker_id: worker_id.to_string(),
                    }
                    .emit();
                } else {
                    TraceEvent::ClaimWon {
                        summary_id: artifact.summary_id,
                        worker_id: worker_id.to_string(),
                        processing_attempts: artifact.processing_attempts,
                    }
                    .emit();
                }
                artifact
            }
            Ok(None) => {
                TraceEvent::ClaimLost {
                    summary_id,
                    worker_id: worker_id.to_string(),
                }
                .emit();
                continue;
            }
            Err(e) => {
                tracing::warn!(summary_id, error = %e, "failed to claim transcript, skipping");
                continue;
            }
        };

        if let Err(e) = process_artifact(state, &artifact).await {
            tracing::warn!(summary_id = artifact.summary_id, error = %e, "failed to persist processing result");
        }
    }
}

/// One claimed row's worth of work. Any store error here is logged by the
/// caller and the rest of the batch keeps going; the row's lease simply
/// lapses and another worker reclaims it later.
async fn process_artifact(state: &AppState, artifact: &TranscriptArtifact) -> ll_domain::error::Result<()> {
    if artifact.transcript_too_short(MIN_TRANSCRIPT_CHARS) {
        let reason = "transcript missing or below minimum length".to_string();
        state.analytical.mark_failed(artifact.summary_id, &reason).await?;
        TraceEvent::TranscriptRejected {
            summary_id: artifact.summary_id,
            reason,
        }
        .emit();
        return Ok(());
    }

    let transcript = artifact.transcript.clone().unwrap_or_default();
    let soft_deadline = Duration::from_secs(state.config.worker_soft_deadline_seconds);

    let generated = tokio::time::timeout(
        soft_deadline,
        state.engine.generate(artifact.summary_id, &transcript, &state.engine_config),
    )
    .await;

    match generated {
        Ok(Ok(document)) => {
            TraceEvent::QualityGateEvaluated {
                summary_id: artifact.summary_id,
                score: document.metadata.quality_score,
                passed: document.metadata.quality_passed,
            }
            .emit();

            let exercise_set = ExerciseSet {
                id: Uuid::new_v4(),
                summary_id: artifact.summary_id,
                user_id: artifact.user_id.clone(),
                teacher_id: artifact.teacher_id.clone(),
                class_id: artifact.class_id.clone(),
                generated_at: Utc::now(),
                exercises: document,
                status: ExerciseSetStatus::PendingApproval,
            };

            state.analytical.complete_with_exercise_set(&exercise_set).await?;
            TraceEvent::ExerciseSetPersisted {
                summary_id: artifact.summary_id,
                exercise_set_id: exercise_set.id.to_string(),
            }
            .emit();
        }
        Ok(Err(e)) => {
            return_to_queue(state, artifact, &e.to_string()).await?;
        }
        Err(_) => {
            return_to_queue(state, artifact, "engine call exceeded soft deadline").await?;
        }
    }

    Ok(())
}

async fn return_to_queue(
    state: &AppState,
    artifact: &TranscriptArtifact,
    reason: &str,
) -> ll_domain::error::Result<()> {
    let terminal = state
        .analytical
        .return_to_queue(
            artifact.summary_id,
            artifact.processing_attempts,
            state.config.worker_max_retries,
            reason,
        )
        .await?;

    TraceEvent::RowReturnedToQueue {
        summary_id: artifact.summary_id,
        processing_attempts: artifact.processing_attempts,
        terminal,
    }
    .emit();

    Ok(())
}
