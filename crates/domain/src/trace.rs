use serde::Serialize;

/// Structured trace events emitted across the monitor, worker, and API
/// processes. Each is logged as a single JSON-encoded `tracing` field so
/// downstream log aggregation can filter on `event` without parsing prose.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ClassDispatched {
        class_id: String,
        idempotency_key: String,
        status: u16,
    },
    DispatchSkippedDuplicate {
        class_id: String,
    },
    DispatchFailed {
        class_id: String,
        retryable: bool,
        reason: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        payload_digest: Option<String>,
    },
    ClaimWon {
        summary_id: i64,
        worker_id: String,
        processing_attempts: i32,
    },
    ClaimLost {
        summary_id: i64,
        worker_id: String,
    },
    LeaseReclaimed {
        summary_id: i64,
        worker_id: String,
    },
    TranscriptRejected {
        summary_id: i64,
        reason: String,
    },
    EngineFallback {
        summary_id: i64,
        stage: String,
        reason: String,
    },
    QualityGateEvaluated {
        summary_id: i64,
        score: u8,
        passed: bool,
    },
    ExerciseSetPersisted {
        summary_id: i64,
        exercise_set_id: String,
    },
    RowReturnedToQueue {
        summary_id: i64,
        processing_attempts: i32,
        terminal: bool,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "pipeline_event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_failed_omits_digest_when_retryable() {
        let event = TraceEvent::DispatchFailed {
            class_id: "c-1".to_string(),
            retryable: true,
            reason: "status 503".to_string(),
            payload_digest: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("payload_digest").is_none());
    }

    #[test]
    fn dispatch_failed_carries_digest_when_permanent() {
        let event = TraceEvent::DispatchFailed {
            class_id: "c-1".to_string(),
            retryable: false,
            reason: "status 422".to_string(),
            payload_digest: Some("abc123".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payload_digest"], "abc123");
        assert_eq!(json["event"], "DispatchFailed");
    }
}
