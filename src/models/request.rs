use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;

/// An outbound call to the backend.
///
/// Requests are cloned and reissued as-is when the interceptor replays them,
/// `request_id` included, so every attempt of one logical call shares an id.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub request_id: Uuid,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url) -> Self {
        ApiRequest {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            request_id: Uuid::new_v4(),
        }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: Url) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a JSON body.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Encode(e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    /// The URL path with any trailing slash removed, used for endpoint matching.
    pub fn path(&self) -> &str {
        let path = self.url.path();
        if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        }
    }

    /// True when this request targets `endpoint` (e.g. `/api/v1/auth/login`).
    pub fn targets(&self, endpoint: &str) -> bool {
        let endpoint = if endpoint.len() > 1 {
            endpoint.trim_end_matches('/')
        } else {
            endpoint
        };
        self.path() == endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_targets_ignores_trailing_slash_and_query() {
        let req = ApiRequest::post(url("https://shop.example/api/v1/auth/login/?next=cart"));
        assert!(req.targets("/api/v1/auth/login"));
        assert!(req.targets("/api/v1/auth/login/"));
        assert!(!req.targets("/api/v1/auth/refresh"));
    }

    #[test]
    fn test_targets_does_not_match_prefixes() {
        let req = ApiRequest::get(url("https://shop.example/api/v1/auth/login-history"));
        assert!(!req.targets("/api/v1/auth/login"));
    }

    #[test]
    fn test_clone_keeps_request_id() {
        let req = ApiRequest::get(url("https://shop.example/api/v1/orders"));
        let replay = req.clone();
        assert_eq!(req.request_id, replay.request_id);
    }

    #[test]
    fn test_with_json_sets_body() {
        let req = ApiRequest::post(url("https://shop.example/api/v1/cart"))
            .with_json(&serde_json::json!({"product_id": 7, "quantity": 2}))
            .unwrap();
        assert_eq!(req.body.unwrap()["quantity"], 2);
    }

    #[test]
    fn test_with_json_rejects_unserializable_body() {
        // JSON object keys must be strings.
        let mut body = std::collections::HashMap::new();
        body.insert((1u8, 2u8), 3u8);
        let err = ApiRequest::post(url("https://shop.example/api/v1/cart"))
            .with_json(&body)
            .unwrap_err();
        assert!(matches!(err, ApiError::Encode(_)));
    }
}
