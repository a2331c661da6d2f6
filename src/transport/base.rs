use std::sync::Arc;

use crate::error::ApiError;
use crate::models::{ApiRequest, ApiResponse};

/// Sends one request to the backend. This is the `next` handler the
/// interceptor forwards to, and the seam tests replace with fakes.
///
/// Implementations return `Ok` only for 2xx responses; any other status is an
/// [`ApiError::Status`].
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request).await
    }
}
