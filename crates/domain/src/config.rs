use std::time::Duration;

use crate::error::{Error, Result};

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_required(name: &str) -> Result<String> {
    env_string(name).ok_or_else(|| Error::Config(format!("missing required env var {name}")))
}

fn env_u64(name: &str, default: u64) -> Result<u64> {
    match env_string(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} must be a non-negative integer, got {raw:?}"))),
    }
}

fn env_u8(name: &str, default: u8) -> Result<u8> {
    match env_string(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| Error::Config(format!("{name} must be 0-255, got {raw:?}"))),
    }
}

/// Process-wide configuration, assembled once at startup from the
/// environment. Shared immutably across the monitor, worker, and HTTP
/// surface — none of these recognize a config file.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_operational_dsn: String,
    pub store_analytical_url: String,
    pub store_analytical_key: Option<String>,

    pub webhook_url: String,
    pub webhook_timeout_seconds: u64,

    pub monitor_poll_interval_seconds: u64,
    pub monitor_batch_size: u64,

    pub worker_poll_interval_seconds: u64,
    pub worker_batch_size: u64,
    pub worker_max_retries: u32,
    pub worker_lease_seconds: u64,
    pub worker_soft_deadline_seconds: u64,

    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub translation_target_language: Option<String>,
    pub quality_min: u8,

    pub http_bind_addr: String,
    pub idempotency_window_seconds: u64,
    pub shutdown_grace_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_analytical_url = env_required("STORE_ANALYTICAL_URL")
            .or_else(|_| env_required("STORE_OPERATIONAL_DSN").map(|_| String::new()))
            .and_then(|v| {
                if v.is_empty() {
                    env_required("STORE_ANALYTICAL_URL")
                } else {
                    Ok(v)
                }
            })?;

        let config = Self {
            store_operational_dsn: env_required("STORE_OPERATIONAL_DSN")?,
            store_analytical_url,
            store_analytical_key: env_string("STORE_ANALYTICAL_KEY"),

            webhook_url: env_required("WEBHOOK_URL")?,
            webhook_timeout_seconds: env_u64("WEBHOOK_TIMEOUT_SECONDS", 30)?,

            monitor_poll_interval_seconds: env_u64("MONITOR_POLL_INTERVAL_SECONDS", 60)?,
            monitor_batch_size: env_u64("MONITOR_BATCH_SIZE", 50)?,

            worker_poll_interval_seconds: env_u64("WORKER_POLL_INTERVAL_SECONDS", 60)?,
            worker_batch_size: env_u64("WORKER_BATCH_SIZE", 10)?,
            worker_max_retries: env_u64("WORKER_MAX_RETRIES", 5)? as u32,
            worker_lease_seconds: env_u64("WORKER_LEASE_SECONDS", 600)?,
            worker_soft_deadline_seconds: env_u64("WORKER_SOFT_DEADLINE_SECONDS", 60)?,

            llm_api_key: env_string("LLM_API_KEY"),
            llm_model: env_string("LLM_MODEL"),
            translation_target_language: env_string("TRANSLATION_TARGET_LANGUAGE"),
            quality_min: env_u8("QUALITY_MIN", 60)?,

            http_bind_addr: env_string("HTTP_BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".into()),
            idempotency_window_seconds: env_u64("IDEMPOTENCY_WINDOW_SECONDS", 86_400)?,
            shutdown_grace_seconds: env_u64("SHUTDOWN_GRACE_SECONDS", 10)?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.webhook_url.starts_with("http://") && !self.webhook_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "WEBHOOK_URL must be an http(s) URL, got {:?}",
                self.webhook_url
            )));
        }
        if self.worker_max_retries == 0 {
            return Err(Error::Config("WORKER_MAX_RETRIES must be >= 1".into()));
        }
        Ok(())
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_seconds)
    }

    pub fn worker_lease_duration(&self) -> Duration {
        Duration::from_secs(self.worker_lease_seconds)
    }

    pub fn llm_available(&self) -> bool {
        self.llm_api_key.is_some()
    }

    /// Defaults to English when unset, matching "engine default" in the spec.
    pub fn translation_target_language_or_default(&self) -> &str {
        self.translation_target_language.as_deref().unwrap_or("en")
    }
}
