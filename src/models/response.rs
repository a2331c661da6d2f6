use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// A successful (2xx) response from the backend.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        ApiResponse {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Decodes the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let body: &[u8] = if self.body.is_empty() {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_json_decodes_body() {
        let resp = ApiResponse::new(StatusCode::OK, r#"{"items": [1, 2]}"#);
        let value: Value = resp.json().unwrap();
        assert_eq!(value["items"][1], 2);
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let resp = ApiResponse::new(StatusCode::NO_CONTENT, Vec::new());
        let value: Value = resp.json().unwrap();
        assert!(value.is_null());
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let resp = ApiResponse::new(StatusCode::OK, "<html>");
        let err = resp.json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
