//! LifeGoal push subscription service
//!
//! A small HTTP/JSON API that records browser push subscriptions for signed-in
//! users. Delivery itself belongs to the browser push provider.
//!
//! ## Endpoints
//! - `GET  /health`
//! - `POST /subscribe` (bearer token required)
//! - `POST /test`
//! - `POST /api/save-subscription`, `GET /api/vapid-public-key` (development only)

pub mod auth;
pub mod config;
pub mod dev;
pub mod error;
pub mod routes;
pub mod store;

use axum::Router;
use std::sync::Arc;

pub use auth::{AuthError, HmacTokenVerifier, TokenVerifier};
pub use config::{PushConfig, PushConfigError};
pub use error::ApiError;
pub use store::{MemorySubscriptionStore, PushSubscription, SubscriptionStore};

/// Shared state available to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<PushConfig>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub subscriptions: Arc<dyn SubscriptionStore>,
}

impl AppState {
    /// State backed by an HMAC verifier on the configured secret and an
    /// in-memory subscription store.
    #[must_use]
    pub fn from_config(config: PushConfig) -> Self {
        let verifier = HmacTokenVerifier::new(&config.secret);
        Self {
            config: Arc::new(config),
            verifier: Arc::new(verifier),
            subscriptions: Arc::new(MemorySubscriptionStore::new()),
        }
    }
}

/// Build the router; development routes are merged only when enabled.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new().merge(routes::routes());
    if state.config.dev_routes {
        log::warn!("development routes enabled");
        router = router.merge(dev::routes());
    }
    router.with_state(state)
}

/// Bind the configured address and serve until the process stops.
///
/// # Errors
///
/// Returns an error when the address cannot be bound or the server fails.
pub async fn serve(config: PushConfig) -> anyhow::Result<()> {
    let addr = config.addr;
    let app = build_router(AppState::from_config(config));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("push service listening on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
