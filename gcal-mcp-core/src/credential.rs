//! The OAuth credential record.
//!
//! Serialized layout matches what Google's client libraries read back:
//!
//! ```json
//! { "type": "authorized_user", "client_id": "...", "client_secret": "...", "refresh_token": "..." }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of principal a credential acts as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    AuthorizedUser,
    ServiceAccount,
}

/// Delegated permission to act on a user's calendar.
///
/// `client_id` doubles as the identity key the token stores index by.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "type")]
    pub kind: CredentialKind,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,

    /// Short-lived bearer token. Never persisted.
    #[serde(skip)]
    pub access_token: Option<String>,

    #[serde(skip)]
    pub access_token_expires_at: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn authorized_user(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Credential {
            kind: CredentialKind::AuthorizedUser,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            access_token: None,
            access_token_expires_at: None,
        }
    }

    pub fn with_access_token(mut self, access_token: impl Into<String>) -> Self {
        self.access_token = Some(access_token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.access_token_expires_at = Some(expires_at);
        self
    }

    pub fn identity_key(&self) -> &str {
        &self.client_id
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("access_token_expires_at", &self.access_token_expires_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_google_authorized_user_layout() {
        let credential = Credential::authorized_user("id-1", "secret-1", "refresh-1")
            .with_access_token("access-1");

        let value = serde_json::to_value(&credential).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "type": "authorized_user",
                "client_id": "id-1",
                "client_secret": "secret-1",
                "refresh_token": "refresh-1",
            })
        );
    }

    #[test]
    fn test_access_token_is_not_read_back() {
        let json = r#"{"type":"authorized_user","client_id":"a","client_secret":"b","refresh_token":"c","access_token":"d"}"#;

        let credential: Credential = serde_json::from_str(json).unwrap();

        assert_eq!(credential.identity_key(), "a");
        assert_eq!(credential.access_token, None);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = Credential::authorized_user("id-1", "secret-1", "refresh-1");

        let debug = format!("{:?}", credential);

        assert!(debug.contains("id-1"));
        assert!(!debug.contains("secret-1"));
        assert!(!debug.contains("refresh-1"));
    }
}
