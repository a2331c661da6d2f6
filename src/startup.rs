//! Application startup.
//!
//! Builds the client stack from configuration: session store, raw transport,
//! auth session, interceptor and the intercepted API client on top.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::client::StorefrontClient;
use crate::config::ConfigV1;
use crate::error::ConfigError;
use crate::feedback::{HeadlessNavigator, LogNotifier};
use crate::interceptor::{AuthRefreshInterceptor, InterceptedTransport, InterceptorSettings};
use crate::metrics::Metrics;
use crate::session::HttpAuthSession;
use crate::state::AppState;
use crate::store::create_session_store;
use crate::transport::{ReqwestTransport, Transport};

/// Wires the whole client stack.
///
/// # Errors
///
/// Returns an error if the base URL is invalid, the session store is
/// misconfigured, or the HTTP client cannot be built.
pub fn build(config: Arc<ConfigV1>) -> Result<AppState, ConfigError> {
    let base_url = config.backend.base_url()?;
    let store = create_session_store(&config.session)?;
    let timeout = Duration::from_millis(config.backend.timeout_in_ms);

    // The session talks to the raw transport; everything else goes through
    // the interceptor.
    let raw: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(timeout, store.clone())?);
    let session = Arc::new(HttpAuthSession::new(
        &config.backend,
        raw.clone(),
        store.clone(),
    )?);

    let notifier = Arc::new(LogNotifier::new(config.notifications.history));
    let navigator = Arc::new(HeadlessNavigator::default());
    let metrics = Metrics::new();

    let interceptor = Arc::new(
        AuthRefreshInterceptor::new(session.clone(), notifier.clone(), navigator.clone())
            .with_settings(InterceptorSettings::from_config(
                &config.navigation,
                &config.notifications,
            ))
            .with_metrics(Arc::new(metrics.clone())),
    );
    let client = StorefrontClient::new(
        base_url,
        Arc::new(InterceptedTransport::new(raw, interceptor.clone())),
    );

    info!(
        base_url = %config.backend.base_url,
        persistent_session = store.is_persistent(),
        "Storefront client ready"
    );

    Ok(AppState {
        config,
        store,
        session,
        notifier,
        navigator,
        interceptor,
        client,
        metrics,
    })
}
