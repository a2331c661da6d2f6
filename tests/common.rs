use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use reqwest::Url;
use storefront_client::client::StorefrontClient;
use storefront_client::config::{Config, ConfigV1};
use storefront_client::error::ApiError;
use storefront_client::feedback::{HeadlessNavigator, LogNotifier};
use storefront_client::interceptor::{
    AuthRefreshInterceptor, InterceptedTransport, InterceptorSettings,
};
use storefront_client::metrics::Metrics;
use storefront_client::models::{ApiRequest, ApiResponse};
use storefront_client::session::HttpAuthSession;
use storefront_client::store::{create_session_store, SessionStore};
use storefront_client::transport::{ReqwestTransport, Transport};
use tokio::sync::Barrier;

const TEST_CONFIG: &str = r#"
version: "1.0.0"
backend:
  base_url: "__BASE_URL__"
  timeout_in_ms: 3000
session:
  enabled: false
navigation:
  login_route: "/login"
logging:
  level: "debug"
  format: "json"
"#;

pub fn load_test_config(base_url: &str) -> ConfigV1 {
    let yaml = TEST_CONFIG.replace("__BASE_URL__", base_url);
    let config: Config = Figment::new()
        .merge(Yaml::string(&yaml))
        .extract()
        .expect("Failed to parse test config YAML");

    match config {
        Config::ConfigV1(cfg) => cfg,
    }
}

/// Holds the first `remaining` auth failures until all of them have arrived,
/// so concurrent requests see their 401s before anyone starts refreshing.
pub struct GatedTransport {
    inner: Arc<dyn Transport>,
    barrier: Barrier,
    remaining: AtomicUsize,
}

impl GatedTransport {
    pub fn new(inner: Arc<dyn Transport>, failures: usize) -> Self {
        GatedTransport {
            inner,
            barrier: Barrier::new(failures),
            remaining: AtomicUsize::new(failures),
        }
    }
}

#[async_trait::async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let result = self.inner.send(request).await;
        if matches!(&result, Err(e) if e.is_auth_failure())
            && self
                .remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            self.barrier.wait().await;
        }
        result
    }
}

pub struct TestStack {
    pub store: Arc<dyn SessionStore>,
    pub navigator: Arc<HeadlessNavigator>,
    pub notifier: Arc<LogNotifier>,
    pub metrics: Metrics,
    pub client: StorefrontClient,
}

/// Same wiring as `startup::build`, with the intercepted path gated.
pub fn build_gated_stack(config: &ConfigV1, concurrent_failures: usize) -> TestStack {
    let store = create_session_store(&config.session).expect("store");
    let raw: Arc<dyn Transport> = Arc::new(
        ReqwestTransport::new(
            Duration::from_millis(config.backend.timeout_in_ms),
            store.clone(),
        )
        .expect("transport"),
    );
    let session = Arc::new(
        HttpAuthSession::new(&config.backend, raw.clone(), store.clone()).expect("session"),
    );
    let navigator = Arc::new(HeadlessNavigator::default());
    let notifier = Arc::new(LogNotifier::new(config.notifications.history));
    let metrics = Metrics::new();

    let interceptor = Arc::new(
        AuthRefreshInterceptor::new(session, notifier.clone(), navigator.clone())
            .with_settings(InterceptorSettings::from_config(
                &config.navigation,
                &config.notifications,
            ))
            .with_metrics(Arc::new(metrics.clone())),
    );
    let gated = Arc::new(GatedTransport::new(raw, concurrent_failures));
    let client = StorefrontClient::new(
        Url::parse(&config.backend.base_url).expect("base url"),
        Arc::new(InterceptedTransport::new(gated, interceptor)),
    );

    TestStack {
        store,
        navigator,
        notifier,
        metrics,
        client,
    }
}
