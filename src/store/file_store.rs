use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::SessionStore;
use crate::error::SessionError;
use crate::models::SessionToken;

/// Stores the session as a JSON file so it survives between CLI invocations.
///
/// Writes go to a sibling `.tmp` file first and are renamed into place.
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileSessionStore {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<SessionToken>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, token: &SessionToken) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(token)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!("Session written to '{}'", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested").join("session.json"));

        let token = SessionToken::new("access").with_refresh_token("refresh");
        store.save(&token).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(token));
        assert!(!store.tmp_path().exists(), "temp file should be renamed away");

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
        // Clearing twice is fine.
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let store = FileSessionStore::new(&path);
        assert!(matches!(store.load().await, Err(SessionError::Store(_))));
    }
}
