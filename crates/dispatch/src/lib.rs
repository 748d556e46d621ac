use std::time::Duration;

use ll_domain::models::DispatchPayload;
use reqwest::StatusCode;
use tracing::instrument;

/// Outcome of one dispatch attempt. There are no implicit retries here —
/// the caller (monitor or trigger handler) decides retry cadence through
/// its own polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Success { status: u16 },
    Retryable { reason: String },
    Permanent { reason: String },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Retryable { .. })
    }
}

/// Idempotent outbound HTTP client for the external workflow webhook.
///
/// Every call is bounded by a hard timeout and carries an `Idempotency-Key`
/// header so the receiving side can collapse retried deliveries.
#[derive(Clone)]
pub struct DispatchClient {
    http: reqwest::Client,
    webhook_url: String,
}

impl DispatchClient {
    pub fn new(webhook_url: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client builds with static config");

        Self { http, webhook_url }
    }

    #[instrument(skip(self, payload), fields(class_id = %payload.class_id, idempotency_key = %idempotency_key))]
    pub async fn dispatch(&self, payload: &DispatchPayload, idempotency_key: &str) -> DispatchOutcome {
        let response = self
            .http
            .post(&self.webhook_url)
            .header("Content-Type", "application/json")
            .header("Idempotency-Key", idempotency_key)
            .json(payload)
            .send()
            .await;

        match response {
            Ok(resp) => Self::classify(resp.status()),
            Err(e) if e.is_timeout() => DispatchOutcome::Retryable {
                reason: format!("timeout: {e}"),
            },
            Err(e) if e.is_connect() => DispatchOutcome::Retryable {
                reason: format!("connection error: {e}"),
            },
            Err(e) => DispatchOutcome::Retryable {
                reason: format!("network error: {e}"),
            },
        }
    }

    fn classify(status: StatusCode) -> DispatchOutcome {
        if status.is_success() {
            return DispatchOutcome::Success { status: status.as_u16() };
        }
        let code = status.as_u16();
        if code == 408 || code == 429 || status.is_server_error() {
            return DispatchOutcome::Retryable {
                reason: format!("status {code}"),
            };
        }
        DispatchOutcome::Permanent {
            reason: format!("status {code}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn classifies_2xx_as_success() {
        assert_eq!(
            DispatchClient::classify(StatusCode::from_u16(201).unwrap()),
            DispatchOutcome::Success { status: 201 }
        );
    }

    #[test]
    fn classifies_429_and_5xx_as_retryable() {
        assert!(DispatchClient::classify(StatusCode::from_u16(429).unwrap()).is_retryable());
        assert!(DispatchClient::classify(StatusCode::from_u16(503).unwrap()).is_retryable());
        assert!(DispatchClient::classify(StatusCode::from_u16(408).unwrap()).is_retryable());
    }

    #[test]
    fn classifies_other_4xx_as_permanent() {
        let outcome = DispatchClient::classify(StatusCode::from_u16(422).unwrap());
        assert!(matches!(outcome, DispatchOutcome::Permanent { .. }));
    }
}
