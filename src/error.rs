//! Error types shared across the client.

use http::StatusCode;
use thiserror::Error;

/// Message surfaced to callers whenever the session cannot be recovered.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired, please log in again";

/// Errors returned by a [`Transport`](crate::transport::Transport) and by the
/// interceptor wrapped around it.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status {
        status: StatusCode,
        url: String,
        body: String,
    },

    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The request body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The session could not be refreshed and has been torn down.
    #[error("{}", SESSION_EXPIRED_MESSAGE)]
    SessionExpired,
}

impl ApiError {
    /// 401 and 403 are both treated as an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            ApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Errors raised by an [`AuthSession`](crate::session::AuthSession) or its store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session is stored")]
    NotLoggedIn,

    #[error("refresh rejected by backend: {0}")]
    Refresh(#[source] ApiError),

    #[error("login rejected by backend: {0}")]
    Login(#[source] ApiError),

    #[error("session store error: {0}")]
    Store(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Store(err.to_string())
    }
}

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid route '{0}'")]
    InvalidRoute(String),

    #[error("navigation rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error("invalid logging.level '{0}'. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid backend.base_url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build http client: {0}")]
    HttpClient(String),

    #[error("failed to initialise session store: {0}")]
    SessionStore(String),
}
