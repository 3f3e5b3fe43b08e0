use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gcal_mcp_core::Credential;

use super::TokenStore;
use crate::error::StoreError;

/// Single-record token file.
///
/// The file holds one credential; a lookup only matches when the stored
/// `client_id` equals the requested key.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileTokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get(&self, key: &str) -> Result<Option<Credential>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let credential: Credential = serde_json::from_str(&contents)?;

        Ok((credential.client_id == key).then_some(credential))
    }

    async fn put(&self, key: &str, credential: &Credential) -> Result<(), StoreError> {
        if credential.client_id != key {
            tracing::warn!(
                key,
                client_id = %credential.client_id,
                "Storing credential under a key that differs from its client id"
            );
        }

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let contents = serde_json::to_string_pretty(credential)?;

        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| self.io_error(e))?;

        // Owner-only (0600)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| self.io_error(e))?;
        }

        tracing::debug!(path = %self.path.display(), "Saved credential");

        Ok(())
    }
}
