use std::sync::Arc;
use std::time::Instant;

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::refresh_state::{LeaderGuard, RefreshCoordinator, RefreshOutcome, Ticket};
use crate::config::{NavigationConfig, NotificationConfig};
use crate::error::ApiError;
use crate::feedback::{Navigator, Notifier};
use crate::metrics::MetricsRecorder;
use crate::models::{ApiRequest, ApiResponse};
use crate::session::AuthSession;
use crate::transport::Transport;

/// Where to send the user and what to tell them when the session is gone.
#[derive(Clone, Debug)]
pub struct InterceptorSettings {
    pub login_route: String,
    pub expired_title: String,
    pub expired_message: String,
}

impl InterceptorSettings {
    pub fn from_config(navigation: &NavigationConfig, notifications: &NotificationConfig) -> Self {
        InterceptorSettings {
            login_route: navigation.login_route.clone(),
            expired_title: notifications.expired_title.clone(),
            expired_message: notifications.expired_message.clone(),
        }
    }
}

impl Default for InterceptorSettings {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default(), &NotificationConfig::default())
    }
}

pub struct AuthRefreshInterceptor {
    session: Arc<dyn AuthSession>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    coordinator: RefreshCoordinator,
    settings: InterceptorSettings,
    metrics: Option<Arc<dyn MetricsRecorder>>,
}

impl AuthRefreshInterceptor {
    pub fn new(
        session: Arc<dyn AuthSession>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        AuthRefreshInterceptor {
            session,
            notifier,
            navigator,
            coordinator: RefreshCoordinator::new(),
            settings: InterceptorSettings::default(),
            metrics: None,
        }
    }

    pub fn with_settings(mut self, settings: InterceptorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    /// Sends `request` through `next`, recovering from an expired session.
    ///
    /// Errors other than 401/403 and failed logins come back untouched. A
    /// request whose session expired is replayed once after a refresh; if the
    /// session cannot be refreshed the caller gets [`ApiError::SessionExpired`].
    ///
    /// Only refreshes that overlap are merged. A request sent before a refresh
    /// started whose 401 arrives after that refresh settled starts a refresh
    /// of its own; if both fail, teardown (navigation and toast) runs twice.
    pub async fn handle(
        &self,
        request: &ApiRequest,
        next: &dyn Transport,
    ) -> Result<ApiResponse, ApiError> {
        let error = match next.send(request).await {
            Ok(response) => {
                self.record_intercepted("passthrough");
                return Ok(response);
            }
            Err(error) => error,
        };

        if !error.is_auth_failure() {
            self.record_intercepted("non_auth_error");
            return Err(error);
        }

        if request.targets(self.session.login_path()) {
            debug!(
                request_id = %request.request_id,
                url = %request.url,
                "Login rejected, not refreshing"
            );
            self.record_intercepted("login_bypass");
            return Err(error);
        }

        if request.targets(self.session.refresh_path()) {
            warn!(
                event_name = "session.refresh_token.rejected",
                event_domain = "auth",
                request_id = %request.request_id,
                status = error.status().map(|s| s.as_u16()).unwrap_or_default(),
                "Refresh endpoint rejected the session, clearing it"
            );
            self.clear_session(request).await;
            self.record_intercepted("refresh_endpoint_expired");
            return Err(ApiError::SessionExpired);
        }

        match self.coordinator.begin() {
            Ticket::Leader(guard) => self.refresh_and_retry(request, next, guard).await,
            Ticket::Waiter(outcome) => self.wait_and_retry(request, next, outcome).await,
        }
    }

    async fn refresh_and_retry(
        &self,
        request: &ApiRequest,
        next: &dyn Transport,
        guard: LeaderGuard<'_>,
    ) -> Result<ApiResponse, ApiError> {
        info!(
            event_name = "session.refresh.started",
            event_domain = "auth",
            request_id = %request.request_id,
            url = %request.url,
            "Session expired, refreshing"
        );
        let started = Instant::now();
        let refreshed = self.session.refresh().await;
        let elapsed = started.elapsed().as_secs_f64();

        match refreshed {
            Ok(token) => {
                let released = guard.succeed(token);
                self.record_refresh("success", elapsed);
                info!(
                    event_name = "session.refresh.succeeded",
                    event_domain = "auth",
                    request_id = %request.request_id,
                    released_waiters = released,
                    duration_secs = elapsed,
                    "Session refreshed, replaying request"
                );
                let outcome = next.send(request).await;
                self.record_intercepted("retried");
                outcome
            }
            Err(e) => {
                let released = guard.fail();
                self.record_refresh("failure", elapsed);
                warn!(
                    event_name = "session.refresh.failed",
                    event_domain = "auth",
                    request_id = %request.request_id,
                    released_waiters = released,
                    duration_secs = elapsed,
                    "Session refresh failed: {}", e
                );
                self.teardown(request).await;
                self.record_intercepted("session_expired");
                Err(ApiError::SessionExpired)
            }
        }
    }

    async fn wait_and_retry(
        &self,
        request: &ApiRequest,
        next: &dyn Transport,
        outcome: oneshot::Receiver<RefreshOutcome>,
    ) -> Result<ApiResponse, ApiError> {
        if let Some(metrics) = &self.metrics {
            metrics.record_waiter();
        }
        debug!(
            request_id = %request.request_id,
            url = %request.url,
            "Waiting on in-flight session refresh"
        );

        match outcome.await {
            Ok(RefreshOutcome::Refreshed) => {
                let outcome = next.send(request).await;
                self.record_intercepted("waited");
                outcome
            }
            // A closed channel means the refresh was abandoned.
            Ok(RefreshOutcome::Failed) | Err(_) => {
                debug!(
                    request_id = %request.request_id,
                    "In-flight refresh failed, giving up"
                );
                self.record_intercepted("session_expired");
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// Clears the session, then sends the user to the login screen with an
    /// error toast. Navigation and notification failures are only logged.
    async fn teardown(&self, request: &ApiRequest) {
        self.clear_session(request).await;

        if let Err(e) = self.navigator.navigate(&self.settings.login_route).await {
            warn!(
                request_id = %request.request_id,
                route = %self.settings.login_route,
                "Navigation to login failed: {}", e
            );
        }

        if let Err(e) = self
            .notifier
            .show_error_toast(&self.settings.expired_title, &self.settings.expired_message)
            .await
        {
            warn!(request_id = %request.request_id, "Failed to show toast: {}", e);
        }
    }

    async fn clear_session(&self, request: &ApiRequest) {
        if let Err(e) = self.session.clear_user_data().await {
            warn!(request_id = %request.request_id, "Failed to clear session: {}", e);
        }
    }

    fn record_intercepted(&self, outcome: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_intercepted(outcome);
        }
    }

    fn record_refresh(&self, result: &str, elapsed: f64) {
        if let Some(metrics) = &self.metrics {
            metrics.record_refresh(result);
            metrics.record_refresh_duration(elapsed, result);
        }
    }
}

/// A [`Transport`] whose every call goes through an [`AuthRefreshInterceptor`].
pub struct InterceptedTransport {
    inner: Arc<dyn Transport>,
    interceptor: Arc<AuthRefreshInterceptor>,
}

impl InterceptedTransport {
    pub fn new(inner: Arc<dyn Transport>, interceptor: Arc<AuthRefreshInterceptor>) -> Self {
        InterceptedTransport { inner, interceptor }
    }

    pub fn interceptor(&self) -> &AuthRefreshInterceptor {
        &self.interceptor
    }
}

#[async_trait::async_trait]
impl Transport for InterceptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.interceptor.handle(request, self.inner.as_ref()).await
    }
}
