use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use super::{file_store::FileSessionStore, memory_store::MemorySessionStore};
use crate::config::{StoreBackend, StoreConfig};
use crate::error::{ConfigError, SessionError};
use crate::models::SessionToken;

/// Persistence for the current session (load, save, clear).
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<SessionToken>, SessionError>;
    async fn save(&self, token: &SessionToken) -> Result<(), SessionError>;
    async fn clear(&self) -> Result<(), SessionError>;

    /// False when the session is lost on exit.
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Creates a concrete store implementation based on the StoreConfig.
/// If `session.enabled = false`, returns the in-memory store. Otherwise, picks the specified backend.
pub fn create_session_store(config: &StoreConfig) -> Result<Arc<dyn SessionStore>, ConfigError> {
    if !config.enabled {
        info!("Session persistence is disabled. Using in-memory store.");
        return Ok(Arc::new(MemorySessionStore::new()));
    }

    match &config.backend {
        Some(StoreBackend::File(file_config)) => {
            info!("Persisting session to '{}'", file_config.path.display());
            Ok(Arc::new(FileSessionStore::new(&file_config.path)))
        }
        None => {
            error!("Session persistence is enabled, but no backend config is provided!");
            Err(ConfigError::SessionStore(
                "session.enabled is true but no session.type was given".to_string(),
            ))
        }
    }
}
