use super::SessionStore;
use crate::error::SessionError;
use crate::models::SessionToken;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Keeps the session in process memory only; it is gone on restart.
pub struct MemorySessionStore {
    token: RwLock<Option<SessionToken>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        MemorySessionStore {
            token: RwLock::new(None),
        }
    }

    pub fn with_token(token: SessionToken) -> Self {
        MemorySessionStore {
            token: RwLock::new(Some(token)),
        }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        Ok(self.token.read().await.clone())
    }

    async fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        *self.token.write().await = Some(token.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.token.write().await = None;
        Ok(())
    }

    fn is_persistent(&self) -> bool {
        false
    }
}
