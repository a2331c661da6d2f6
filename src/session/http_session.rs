use std::sync::Arc;

use reqwest::Url;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::AuthSession;
use crate::config::BackendConfig;
use crate::error::{ApiError, ConfigError, SessionError};
use crate::models::{ApiRequest, Credentials, SessionToken};
use crate::store::SessionStore;
use crate::transport::Transport;

/// Talks to the backend's auth endpoints and keeps the result in a [`SessionStore`].
///
/// It uses the raw transport rather than the intercepted one: a failing
/// refresh must surface here, not trigger another refresh.
pub struct HttpAuthSession {
    base_url: Url,
    login_path: String,
    refresh_path: String,
    logout_path: String,
    transport: Arc<dyn Transport>,
    store: Arc<dyn SessionStore>,
}

impl HttpAuthSession {
    pub fn new(
        config: &BackendConfig,
        transport: Arc<dyn Transport>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, ConfigError> {
        Ok(HttpAuthSession {
            base_url: config.base_url()?,
            login_path: config.login_path.clone(),
            refresh_path: config.refresh_path.clone(),
            logout_path: config.logout_path.clone(),
            transport,
            store,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid endpoint '{}': {}", path, e)))
    }

    /// Signs in and stores the returned session.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionToken, SessionError> {
        info!("Logging in as '{}'", credentials.email);
        let url = self.endpoint(&self.login_path).map_err(SessionError::Login)?;
        let request = ApiRequest::post(url)
            .with_json(credentials)
            .map_err(SessionError::Login)?;

        let token: SessionToken = self
            .transport
            .send(&request)
            .await
            .and_then(|response| response.json())
            .map_err(SessionError::Login)?;

        self.store.save(&token).await?;
        info!("Logged in as '{}'", credentials.email);
        Ok(token)
    }

    /// Tells the backend to drop the session, then forgets it locally even if
    /// the backend call failed.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let remote = async {
            let url = self.endpoint(&self.logout_path)?;
            let request = ApiRequest::post(url).with_json(&json!({}))?;
            self.transport.send(&request).await
        };
        if let Err(e) = remote.await {
            warn!("Logout call failed, clearing local session anyway: {}", e);
        }
        self.store.clear().await
    }

    pub async fn current(&self) -> Result<Option<SessionToken>, SessionError> {
        self.store.load().await
    }
}

#[async_trait::async_trait]
impl AuthSession for HttpAuthSession {
    async fn refresh(&self) -> Result<SessionToken, SessionError> {
        let stored = self.store.load().await?;
        // Cookie-based backends carry the refresh credential themselves; only
        // send one in the body when we hold it.
        let body = match stored.as_ref().and_then(|t| t.refresh_token.as_deref()) {
            Some(refresh_token) => json!({ "refresh_token": refresh_token }),
            None => Value::Object(Default::default()),
        };
        let url = self
            .endpoint(&self.refresh_path)
            .map_err(SessionError::Refresh)?;
        let request = ApiRequest::post(url)
            .with_json(&body)
            .map_err(SessionError::Refresh)?;

        debug!(request_id = %request.request_id, "Calling refresh endpoint");
        let outcome = self
            .transport
            .send(&request)
            .await
            .and_then(|response| response.json::<SessionToken>());

        match outcome {
            Ok(mut token) => {
                // Backends that do not rotate refresh tokens omit them on refresh.
                if token.refresh_token.is_none() {
                    token.refresh_token = stored.and_then(|t| t.refresh_token);
                }
                self.store.save(&token).await?;
                Ok(token)
            }
            Err(e) => {
                if let Err(clear_err) = self.store.clear().await {
                    warn!("Failed to clear session after refresh failure: {}", clear_err);
                }
                Err(SessionError::Refresh(e))
            }
        }
    }

    async fn clear_user_data(&self) -> Result<(), SessionError> {
        self.store.clear().await
    }

    async fn is_logged_in(&self) -> bool {
        matches!(self.store.load().await, Ok(Some(_)))
    }

    fn login_path(&self) -> &str {
        &self.login_path
    }

    fn refresh_path(&self) -> &str {
        &self.refresh_path
    }
}
