use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The session payload returned by the backend's login and refresh endpoints.
///
/// The interceptor treats it as opaque and only hands it to the session for
/// persistence.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SessionToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Whatever user record the backend sends along (id, email, roles, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
}

impl SessionToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        SessionToken {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            user: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Login form payload.
#[derive(Serialize, Deserialize, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_parses_minimal_backend_payload() {
        let token: SessionToken = serde_json::from_str(r#"{"access_token": "abc"}"#).unwrap();
        assert_eq!(token.access_token, "abc");
        assert!(token.refresh_token.is_none());
        assert_eq!(token.bearer(), "Bearer abc");
    }

    #[test]
    fn test_token_skips_missing_fields_when_serialized() {
        let json = serde_json::to_string(&SessionToken::new("abc")).unwrap();
        assert!(!json.contains("refresh_token"));
        assert!(!json.contains("user"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let creds = Credentials {
            email: "jane@example.com".into(),
            password: "hunter2".into(),
        };
        let printed = format!("{:?}", creds);
        assert!(printed.contains("jane@example.com"));
        assert!(!printed.contains("hunter2"));
    }
}
