use std::time::Duration;

use ll_domain::models::{Class, DispatchPayload};
use ll_domain::trace::TraceEvent;
use ll_dispatch::DispatchOutcome;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Runs the class monitor loop until `shutdown` is cancelled: on every tick,
/// scans the operational store for ended-but-undispatched classes, dispatches
/// each to the external webhook, and conditionally flips `ai_triggered` only
/// on a successful delivery. A tick already in flight when shutdown is
/// requested gets up to `shutdown_grace_seconds` to finish before it is
/// abandoned.
pub async fn run(state: AppState, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(
        state.config.monitor_poll_interval_seconds,
    ));
    let grace = Duration::from_secs(state.config.shutdown_grace_seconds);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = shutdown.cancelled() => {
                tracing::info!("class monitor stopping: shutdown requested");
                break;
            }
        }

        let work = tick(&state);
        tokio::pin!(work);

        tokio::select! {
            _ = &mut work => {}
            _ = shutdown.cancelled() => {
                tracing::warn!("shutdown requested mid-tick, waiting up to shutdown_grace_seconds to finish");
                if tokio::time::timeout(grace, work).await.is_err() {
                    tracing::warn!("class monitor tick abandoned: exceeded shutdown grace period");
                }
                break;
            }
        }

        if shutdown.is_cancelled() {
            tracing::info!("class monitor stopping: shutdown requested");
            break;
        }
    }
}

async fn tick(state: &AppState) {
    let batch_size = state.config.monitor_batch_size as i64;
    let classes = match state.operational.ended_undispatched_classes(batch_size).await {
        Ok(classes) => classes,
        Err(e) => {
            tracing::warn!(error = %e, "failed to scan for ended classes");
            return;
        }
    };

    for class in classes {
        if let Err(e) = process_class(state, &class).await {
            tracing::warn!(class_id = %class.class_id, error = %e, "skipping class after dispatch failure");
        }
    }
}

/// One class's worth of work. Any store or lookup error here is logged by
/// the caller and the rest of the batch keeps going.
async fn process_class(state: &AppState, class: &Class) -> ll_domain::error::Result<()> {
    let teacher = state.operational.lookup_teacher(&class.teacher_id).await?;
    let teacher_email = teacher.and_then(|t| t.email);

    let (date, start_time, end_time) = match (class.meeting_start, class.meeting_end) {
        (Some(start), Some(end)) => (
            start.date_naive().to_string(),
            start.time().to_string(),
            end.time().to_string(),
        ),
        _ => {
            tracing::warn!(class_id = %class.class_id, "ended class missing meeting times, skipping");
            return Ok(());
        }
    };

    let payload = DispatchPayload {
        user_id: class.student_id.clone(),
        teacher_id: class.teacher_id.clone(),
        class_id: class.class_id.clone(),
        date,
        start_time,
        end_time,
        teacher_email,
    };
    let idempotency_key = payload.idempotency_key();

    match state.dispatch.dispatch(&payload, &idempotency_key).await {
        DispatchOutcome::Success { status } => {
            if state.operational.mark_dispatched(&class.class_id).await? {
                TraceEvent::ClassDispatched {
                    class_id: class.class_id.clone(),
                    idempotency_key,
                    status,
                }
                .emit();
            } else {
                TraceEvent::DispatchSkippedDuplicate {
                    class_id: class.class_id.clone(),
                }
                .emit();
            }
        }
        DispatchOutcome::Retryable { reason } => {
            TraceEvent::DispatchFailed {
                class_id: class.class_id.clone(),
                retryable: true,
                reason,
                payload_digest: None,
            }
            .emit();
        }
        DispatchOutcome::Permanent { reason } => {
            TraceEvent::DispatchFailed {
                class_id: class.class_id.clone(),
                retryable: false,
                reason,
                payload_digest: Some(payload.payload_digest()),
            }
            .emit();
        }
    }

    Ok(())
}
