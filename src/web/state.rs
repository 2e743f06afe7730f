//! Application state shared across handlers

use crate::assets::AssetStore;
use crate::config::Settings;
use crate::limiter::{KvStore, RateLimiter};
use crate::redirect::SafeDomainSet;
use crate::web::headers::HeaderPolicy;
use std::sync::Arc;

/// Shared application state
///
/// Everything in here is initialized once at start-up and immutable for
/// the process lifetime; per-request data never lands in state.
#[derive(Clone)]
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Abuse-rate limiter over the injected store binding
    pub limiter: Arc<RateLimiter>,
    /// Hostnames a redirect may ever target
    pub safe_domains: Arc<SafeDomainSet>,
    /// Static asset binding (external collaborator)
    pub assets: Arc<dyn AssetStore>,
    /// Response header policy
    pub headers: Arc<HeaderPolicy>,
}

impl AppState {
    /// Create new application state around the injected bindings.
    pub fn new(settings: Settings, store: Arc<dyn KvStore>, assets: Arc<dyn AssetStore>) -> Self {
        let limiter = Arc::new(RateLimiter::new(store, settings.limiter.clone()));
        let headers = Arc::new(HeaderPolicy::new(settings.security.allowed_origins.clone()));

        Self {
            settings: Arc::new(settings),
            limiter,
            safe_domains: Arc::new(SafeDomainSet::standard()),
            assets,
            headers,
        }
    }

    /// Get instance name
    pub fn instance_name(&self) -> &str {
        &self.settings.general.instance_name
    }
}
