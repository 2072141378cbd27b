//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::gateway::GatewayClient;
use crate::services::events::EventBus;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    gateway: GatewayClient,
    events: EventBus,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The payment gateway client is built from `config.gateway`; the
    /// event bus starts with no subscribers (listeners attach at startup).
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let gateway = GatewayClient::new(&config.gateway);
        let events = EventBus::new();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                gateway,
                events,
            }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the payment gateway client.
    #[must_use]
    pub fn gateway(&self) -> &GatewayClient {
        &self.inner.gateway
    }

    /// Get a reference to the order event bus.
    #[must_use]
    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }
}
