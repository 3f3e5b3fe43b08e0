//! Calendar client handles built from an authorized credential.

use std::sync::Arc;

use async_trait::async_trait;
use gcal_mcp_core::Credential;
use tokio::sync::Mutex;

use crate::api::{CalendarApi, DEFAULT_BASE_URL, GoogleCalendarApi};
use crate::authorizer::Authorizer;
use crate::error::AuthError;
use crate::token::{DEFAULT_TOKEN_URL, TokenSource};

/// Builds a provider client from a credential.
#[async_trait]
pub trait CalendarConnector: Send + Sync {
    async fn connect(&self, credential: &Credential) -> Result<Arc<dyn CalendarApi>, AuthError>;
}

/// Connects to the Google Calendar REST API. The client refreshes its
/// access token from the credential's refresh token whenever it expires.
pub struct GoogleConnector {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
}

impl GoogleConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        GoogleConnector {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }
}

impl Default for GoogleConnector {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait]
impl CalendarConnector for GoogleConnector {
    async fn connect(&self, credential: &Credential) -> Result<Arc<dyn CalendarApi>, AuthError> {
        let tokens = TokenSource::new(self.http.clone(), self.token_url.clone(), credential);

        // Fail here rather than on the first call when no token can be had
        tokens.access_token().await?;

        Ok(Arc::new(GoogleCalendarApi::new(
            self.http.clone(),
            self.base_url.clone(),
            Arc::new(tokens),
        )))
    }
}

/// A ready-to-use provider client.
#[derive(Clone)]
pub struct ClientHandle {
    api: Arc<dyn CalendarApi>,
}

impl ClientHandle {
    pub fn new(api: Arc<dyn CalendarApi>) -> Self {
        ClientHandle { api }
    }

    pub fn api(&self) -> &dyn CalendarApi {
        self.api.as_ref()
    }
}

#[derive(Default)]
struct Cached {
    handle: Option<ClientHandle>,
    credential: Option<Credential>,
}

/// Hands out one client handle for the life of the process.
pub struct ClientFactory {
    authorizer: Authorizer,
    connector: Arc<dyn CalendarConnector>,
    cache: Mutex<Cached>,
}

impl ClientFactory {
    pub fn new(authorizer: Authorizer, connector: Arc<dyn CalendarConnector>) -> Self {
        ClientFactory {
            authorizer,
            connector,
            cache: Mutex::new(Cached::default()),
        }
    }

    pub fn authorizer(&self) -> &Authorizer {
        &self.authorizer
    }

    /// Cached handle, or a new one built from a fresh authorization. The
    /// cache lock is held throughout so concurrent callers build once.
    pub async fn client(&self) -> Result<ClientHandle, AuthError> {
        let mut cache = self.cache.lock().await;

        if let (Some(handle), Some(_)) = (&cache.handle, &cache.credential) {
            return Ok(handle.clone());
        }

        let credential = self.authorizer.authorize().await?;
        let handle = ClientHandle::new(self.connector.connect(&credential).await?);

        tracing::info!(client_id = %credential.client_id, "Calendar client ready");

        cache.handle = Some(handle.clone());
        cache.credential = Some(credential);

        Ok(handle)
    }

    /// Drop the cached handle and credential; the next `client()` call
    /// authorizes again.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        cache.handle = None;
        cache.credential = None;
        self.authorizer.clear().await;
    }
}
