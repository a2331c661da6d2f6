//! Shared application state.
//!
//! Everything the CLI (or an embedding UI) needs to talk to the storefront,
//! wired once at startup.

use crate::client::StorefrontClient;
use crate::config::ConfigV1;
use crate::feedback::{HeadlessNavigator, LogNotifier};
use crate::interceptor::AuthRefreshInterceptor;
use crate::metrics::Metrics;
use crate::session::HttpAuthSession;
use crate::store::SessionStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded at startup.
    pub config: Arc<ConfigV1>,
    /// Where the session token lives between calls.
    pub store: Arc<dyn SessionStore>,
    /// Login, logout and refresh against the backend.
    pub session: Arc<HttpAuthSession>,
    pub notifier: Arc<LogNotifier>,
    pub navigator: Arc<HeadlessNavigator>,
    pub interceptor: Arc<AuthRefreshInterceptor>,
    /// API client whose requests go through the interceptor.
    pub client: StorefrontClient,
    pub metrics: Metrics,
}
