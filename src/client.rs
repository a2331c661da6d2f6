//! Typed access to the storefront REST API.

use std::sync::Arc;

use http::Method;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{ApiRequest, ApiResponse};
use crate::transport::Transport;

/// Storefront API client. Built on an [`InterceptedTransport`](crate::interceptor::InterceptedTransport)
/// it survives session expiry transparently.
#[derive(Clone)]
pub struct StorefrontClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl StorefrontClient {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>) -> Self {
        StorefrontClient {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds a request for `path`, resolved against the base URL.
    pub fn request(&self, method: Method, path: &str) -> Result<ApiRequest, ApiError> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| ApiError::Transport(format!("invalid path '{}': {}", path, e)))?;
        Ok(ApiRequest::new(method, url))
    }

    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.transport.send(request).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.send(&request).await?.json()
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path)?.with_json(body)?;
        self.send(&request).await?.json()
    }
}
