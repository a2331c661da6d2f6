use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderValue, AUTHORIZATION};
use http::HeaderName;
use tracing::{debug, warn};

use super::Transport;
use crate::error::{ApiError, ConfigError};
use crate::models::{ApiRequest, ApiResponse};
use crate::store::SessionStore;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// The real transport: a `reqwest::Client` that attaches the stored session's
/// bearer token to every request that does not carry its own credentials.
pub struct ReqwestTransport {
    client: reqwest::Client,
    store: Arc<dyn SessionStore>,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, store: Arc<dyn SessionStore>) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self::with_client(client, store))
    }

    pub fn with_client(client: reqwest::Client, store: Arc<dyn SessionStore>) -> Self {
        ReqwestTransport { client, store }
    }

    /// Looks up the bearer value at send time, so a replayed request picks up
    /// whatever token the last refresh stored.
    async fn authorization(&self, request: &ApiRequest) -> Option<HeaderValue> {
        if request.headers.contains_key(AUTHORIZATION) {
            return None;
        }
        match self.store.load().await {
            Ok(Some(token)) => match HeaderValue::from_str(&token.bearer()) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(
                        request_id = %request.request_id,
                        "Stored access token is not a valid header value, sending without it: {}", e
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(
                    request_id = %request.request_id,
                    "Could not read session for request: {}", e
                );
                None
            }
        }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .header(
                HeaderName::from_static(REQUEST_ID_HEADER),
                request.request_id.to_string(),
            );
        if let Some(auth) = self.authorization(request).await {
            builder = builder.header(AUTHORIZATION, auth);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(
            request_id = %request.request_id,
            method = %request.method,
            url = %request.url,
            "Sending request"
        );

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        debug!(
            request_id = %request.request_id,
            status = status.as_u16(),
            "Received response"
        );

        if status.is_success() {
            Ok(ApiResponse {
                status,
                headers,
                body,
            })
        } else {
            Err(ApiError::Status {
                status,
                url: request.url.to_string(),
                body: String::from_utf8_lossy(&body).into_owned(),
            })
        }
    }
}
