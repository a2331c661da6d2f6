use crate::error::SessionError;
use crate::models::SessionToken;

/// The session the interceptor refreshes and tears down.
///
/// The interceptor never looks inside the [`SessionToken`]; persisting it is
/// the session's job.
#[async_trait::async_trait]
pub trait AuthSession: Send + Sync {
    /// Exchanges the stored credential for a new session and persists it.
    async fn refresh(&self) -> Result<SessionToken, SessionError>;

    /// Forgets the current user and session.
    async fn clear_user_data(&self) -> Result<(), SessionError>;

    async fn is_logged_in(&self) -> bool;

    /// Path of the login endpoint, e.g. `/api/v1/auth/login`.
    fn login_path(&self) -> &str;

    /// Path of the refresh endpoint, e.g. `/api/v1/auth/refresh`.
    fn refresh_path(&self) -> &str;
}
