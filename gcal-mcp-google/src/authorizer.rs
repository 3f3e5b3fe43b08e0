//! Turns client secrets into a usable credential.
//!
//! Order of preference: the credential already obtained by this process,
//! then the token store, then the interactive consent flow. A credential
//! from consent is persisted so the next process start skips the browser.

use std::sync::Arc;

use gcal_mcp_core::Credential;
use tokio::sync::Mutex;

use crate::app_config::SecretsSource;
use crate::consent::ConsentFlow;
use crate::error::AuthError;
use crate::store::TokenStore;

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];

pub struct Authorizer {
    secrets: SecretsSource,
    store: Arc<dyn TokenStore>,
    consent: Arc<dyn ConsentFlow>,
    memo: Mutex<Option<Credential>>,
}

impl Authorizer {
    pub fn new(
        secrets: SecretsSource,
        store: Arc<dyn TokenStore>,
        consent: Arc<dyn ConsentFlow>,
    ) -> Self {
        Authorizer {
            secrets,
            store,
            consent,
            memo: Mutex::new(None),
        }
    }

    /// Yield a credential, running consent at most once across concurrent
    /// callers. The lock is held for the whole resolution.
    pub async fn authorize(&self) -> Result<Credential, AuthError> {
        let mut memo = self.memo.lock().await;

        if let Some(credential) = memo.as_ref() {
            return Ok(credential.clone());
        }

        let secrets = self.secrets.load().await?;
        let key = secrets.client_id.as_str();

        match self.store.get(key).await {
            Ok(Some(credential)) => {
                tracing::debug!(client_id = key, "Using stored credential");
                *memo = Some(credential.clone());
                return Ok(credential);
            }
            Ok(None) => {
                tracing::info!(client_id = key, "No stored credential, starting consent flow");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read stored credential, starting consent flow");
            }
        }

        let credential = self.consent.run(&secrets, SCOPES).await?;

        if credential.refresh_token.is_empty() {
            tracing::warn!(
                client_id = key,
                "Consent returned no refresh token; credential will not be saved"
            );
        } else if let Err(e) = self.store.put(credential.identity_key(), &credential).await {
            tracing::warn!(error = %e, "Failed to save credential");
        }

        *memo = Some(credential.clone());

        Ok(credential)
    }

    /// Forget the in-process credential. The stored record is untouched.
    pub async fn clear(&self) {
        self.memo.lock().await.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::ClientSecrets;
    use crate::testing::{FakeConsent, MemoryTokenStore};

    fn secrets() -> SecretsSource {
        SecretsSource::Inline(ClientSecrets {
            client_id: "client-a".to_string(),
            client_secret: "secret".to_string(),
            redirect_uris: vec![],
        })
    }

    #[tokio::test]
    async fn test_stored_credential_skips_consent() {
        let store = Arc::new(MemoryTokenStore::default());
        store
            .put("client-a", &Credential::authorized_user("client-a", "secret", "r1"))
            .await
            .unwrap();
        let consent = Arc::new(FakeConsent::granting("r-new"));
        let authorizer = Authorizer::new(secrets(), store, consent.clone());

        let credential = authorizer.authorize().await.unwrap();

        assert_eq!(credential.refresh_token, "r1");
        assert_eq!(consent.calls(), 0);
    }

    #[tokio::test]
    async fn test_consent_runs_once_and_is_persisted() {
        let store = Arc::new(MemoryTokenStore::default());
        let consent = Arc::new(FakeConsent::granting("r1"));
        let authorizer = Arc::new(Authorizer::new(secrets(), store.clone(), consent.clone()));

        let (a, b) = tokio::join!(authorizer.authorize(), authorizer.authorize());

        assert_eq!(a.unwrap().refresh_token, "r1");
        assert_eq!(b.unwrap().refresh_token, "r1");
        assert_eq!(consent.calls(), 1);
        assert_eq!(
            store.get("client-a").await.unwrap().unwrap().refresh_token,
            "r1"
        );
    }

    #[tokio::test]
    async fn test_unreadable_store_falls_back_to_consent() {
        let store = Arc::new(MemoryTokenStore::failing_reads());
        let consent = Arc::new(FakeConsent::granting("r1"));
        let authorizer = Authorizer::new(secrets(), store, consent.clone());

        let credential = authorizer.authorize().await.unwrap();

        assert_eq!(credential.refresh_token, "r1");
        assert_eq!(consent.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_refresh_token_is_not_persisted() {
        let store = Arc::new(MemoryTokenStore::default());
        let consent = Arc::new(FakeConsent::granting(""));
        let authorizer = Authorizer::new(secrets(), store.clone(), consent);

        authorizer.authorize().await.unwrap();

        assert!(store.get("client-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consent_failure_propagates() {
        let store = Arc::new(MemoryTokenStore::default());
        let consent = Arc::new(FakeConsent::denying());
        let authorizer = Authorizer::new(secrets(), store, consent);

        let err = authorizer.authorize().await.unwrap_err();

        assert!(matches!(err, AuthError::Consent(_)));
    }

    #[tokio::test]
    async fn test_clear_forces_store_lookup() {
        let store = Arc::new(MemoryTokenStore::default());
        let consent = Arc::new(FakeConsent::granting("r1"));
        let authorizer = Authorizer::new(secrets(), store.clone(), consent.clone());

        authorizer.authorize().await.unwrap();
        store
            .put("client-a", &Credential::authorized_user("client-a", "secret", "r2"))
            .await
            .unwrap();
        authorizer.clear().await;

        assert_eq!(authorizer.authorize().await.unwrap().refresh_token, "r2");
        assert_eq!(consent.calls(), 1);
    }
}
