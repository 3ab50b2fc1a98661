// Application state (AppState)

use crate::core::config::Config;
use crate::metrics::collector::QueryMetrics;
use crate::service::info_query::InfoQueryService;
use crate::stores::session_registry::SessionRegistry;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state
///
/// The registry is shared between the admin feed (which writes) and the
/// query service (which only reads through the client traits).
#[derive(Clone)]
pub struct AppState {
    /// Sessions fed by the engine
    pub registry: Arc<SessionRegistry>,

    pub info_service: InfoQueryService<SessionRegistry>,

    pub metrics: Arc<QueryMetrics>,

    /// Cancelled on shutdown; every query waits on a child of it
    pub shutdown: CancellationToken,

    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(SessionRegistry::with_capacity(
            config.server.registry_capacity,
        ));

        Self {
            info_service: InfoQueryService::new(Arc::clone(&registry)),
            registry,
            metrics: Arc::new(QueryMetrics::new()),
            shutdown: CancellationToken::new(),
            config,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State with short timeouts and a known API key
    pub(crate) fn for_tests() -> Self {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8080
            num_threads = 1

            [query]
            default_timeout_ms = 200
            max_timeout_ms = 1000

            [admin]
            api_key = "test-api-key"
            "#,
        )
        .expect("test config is valid");

        Self::new(config)
    }
}
