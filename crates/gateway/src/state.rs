use std::sync::Arc;
use std::time::Duration;

use ll_domain::config::Config;
use ll_dispatch::DispatchClient;
use ll_engine::{Engine, EngineConfig};
use ll_stores::{AnalyticalStore, OperationalStore};

use crate::idempotency::IdempotencyStore;

/// Shared application state passed to all HTTP handlers and consulted by
/// the monitor and worker loops.
///
/// Fields are grouped by concern:
/// - **Core services** — config, store adapters, dispatch client, engine
/// - **HTTP surface** — idempotency cache for mutating endpoints
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub operational: Arc<OperationalStore>,
    pub analytical: Arc<AnalyticalStore>,
    pub dispatch: Arc<DispatchClient>,
    pub engine: Arc<Engine>,
    pub engine_config: Arc<EngineConfig>,

    // ── HTTP surface ─────────────────────────────────────────────────
    pub idempotency: Arc<IdempotencyStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        operational: Arc<OperationalStore>,
        analytical: Arc<AnalyticalStore>,
        dispatch: Arc<DispatchClient>,
        engine: Arc<Engine>,
    ) -> Self {
        let engine_config = Arc::new(EngineConfig::from_domain(&config));
        let idempotency = Arc::new(IdempotencyStore::new(Duration::from_secs(
            config.idempotency_window_seconds,
        )));

        Self {
            config,
            operational,
            analytical,
            dispatch,
            engine,
            engine_config,
            idempotency,
        }
    }
}
