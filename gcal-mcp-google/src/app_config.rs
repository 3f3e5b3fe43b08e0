//! Google OAuth client secrets.
//!
//! The bundle is the JSON file downloaded from the Google Cloud console
//! (`credentials.json`), holding an `installed` or `web` client:
//!
//! ```json
//! { "installed": { "client_id": "...", "client_secret": "...", "redirect_uris": ["http://localhost"] } }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub redirect_uris: Vec<String>,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    pub fn from_json(contents: &str) -> Result<Self, AuthError> {
        let file: SecretsFile = serde_json::from_str(contents)
            .map_err(|e| AuthError::Secrets(format!("Failed to parse client secrets: {}", e)))?;

        file.installed.or(file.web).ok_or_else(|| {
            AuthError::Secrets("client secrets contain neither `installed` nor `web`".to_string())
        })
    }

    pub async fn load(path: &Path) -> Result<Self, AuthError> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
            AuthError::Secrets(format!(
                "Failed to read client secrets from {}: {}\n\n\
                Download an OAuth client (Desktop app) from \
                https://console.cloud.google.com/apis/credentials and save it there.",
                path.display(),
                e
            ))
        })?;

        Self::from_json(&contents)
    }
}

/// Where the authorizer gets its client secrets from.
///
/// Read lazily so a missing bundle surfaces as a failed tool call rather
/// than a failed startup.
#[derive(Debug, Clone)]
pub enum SecretsSource {
    File(PathBuf),
    Inline(ClientSecrets),
}

impl SecretsSource {
    pub async fn load(&self) -> Result<ClientSecrets, AuthError> {
        match self {
            SecretsSource::File(path) => ClientSecrets::load(path).await,
            SecretsSource::Inline(secrets) => Ok(secrets.clone()),
        }
    }
}
