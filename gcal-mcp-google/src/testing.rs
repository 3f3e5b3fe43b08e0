//! In-memory fakes of the provider, consent flow and token store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono_tz::Tz;
use gcal_mcp_core::Credential;

use crate::api::{CalendarApi, ListQuery};
use crate::app_config::{ClientSecrets, SecretsSource};
use crate::authorizer::Authorizer;
use crate::consent::ConsentFlow;
use crate::context::CalendarContext;
use crate::error::{ApiError, AuthError, StoreError};
use crate::google_event::GoogleEvent;
use crate::session::{CalendarConnector, ClientFactory};
use crate::store::TokenStore;

#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<HashMap<String, Credential>>,
    fail_reads: bool,
}

impl MemoryTokenStore {
    /// Every `get` fails as if the backing record were corrupt.
    pub fn failing_reads() -> Self {
        MemoryTokenStore {
            fail_reads: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, key: &str) -> Result<Option<Credential>, StoreError> {
        if self.fail_reads {
            let err = serde_json::from_str::<Credential>("{ corrupt").unwrap_err();
            return Err(StoreError::Parse(err));
        }

        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn put(&self, key: &str, credential: &Credential) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .insert(key.to_string(), credential.clone());
        Ok(())
    }
}

/// Consent that either grants a fixed refresh token or is declined.
pub struct FakeConsent {
    refresh_token: Option<String>,
    calls: AtomicUsize,
}

impl FakeConsent {
    pub fn granting(refresh_token: &str) -> Self {
        FakeConsent {
            refresh_token: Some(refresh_token.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn denying() -> Self {
        FakeConsent {
            refresh_token: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsentFlow for FakeConsent {
    async fn run(&self, secrets: &ClientSecrets, _scopes: &[&str]) -> Result<Credential, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // Let concurrent callers pile up on the authorizer lock
        tokio::task::yield_now().await;

        match &self.refresh_token {
            Some(refresh_token) => Ok(Credential::authorized_user(
                secrets.client_id.clone(),
                secrets.client_secret.clone(),
                refresh_token.clone(),
            )
            .with_access_token("fake-access-token")),
            None => Err(AuthError::Consent("authorization denied: access_denied".to_string())),
        }
    }
}

/// A calendar held in memory. Ids are assigned as `evt-1`, `evt-2`, ...
#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<Vec<GoogleEvent>>,
    inserted: Mutex<Vec<GoogleEvent>>,
    updated: Mutex<Vec<(String, GoogleEvent)>>,
    deleted: Mutex<Vec<String>>,
    queries: Mutex<Vec<ListQuery>>,
    next_id: AtomicUsize,
    failure: Option<(u16, String)>,
    gone_on_delete: bool,
}

impl FakeCalendar {
    pub fn with_events(events: Vec<GoogleEvent>) -> Self {
        FakeCalendar {
            events: Mutex::new(events),
            ..Default::default()
        }
    }

    /// Every call fails with the given HTTP status and message.
    pub fn failing(status: u16, message: &str) -> Self {
        FakeCalendar {
            failure: Some((status, message.to_string())),
            ..Default::default()
        }
    }

    /// Deletes answer `410 Gone` (after removing the event).
    pub fn gone_on_delete(mut self) -> Self {
        self.gone_on_delete = true;
        self
    }

    /// Request bodies received by `insert_event`.
    pub fn inserted(&self) -> Vec<GoogleEvent> {
        self.inserted.lock().unwrap().clone()
    }

    /// `(event_id, body)` pairs received by `update_event`.
    pub fn updated(&self) -> Vec<(String, GoogleEvent)> {
        self.updated.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), ApiError> {
        match &self.failure {
            Some((status, message)) => Err(ApiError::Status {
                status: *status,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }

    fn find(&self, event_id: &str) -> Option<GoogleEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id.as_deref() == Some(event_id))
            .cloned()
    }
}

#[async_trait]
impl CalendarApi for FakeCalendar {
    async fn insert_event(
        &self,
        _calendar_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError> {
        self.check_failure()?;
        self.inserted.lock().unwrap().push(event.clone());

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = event.clone();
        created.id = Some(format!("evt-{}", n));
        created.status = Some("confirmed".to_string());

        self.events.lock().unwrap().push(created.clone());

        Ok(created)
    }

    async fn list_events(
        &self,
        _calendar_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GoogleEvent>, ApiError> {
        self.check_failure()?;
        self.queries.lock().unwrap().push(query.clone());

        Ok(self.events.lock().unwrap().clone())
    }

    async fn get_event(&self, _calendar_id: &str, event_id: &str) -> Result<GoogleEvent, ApiError> {
        self.check_failure()?;
        self.find(event_id).ok_or(ApiError::NotFound)
    }

    async fn update_event(
        &self,
        _calendar_id: &str,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError> {
        self.check_failure()?;
        self.updated
            .lock()
            .unwrap()
            .push((event_id.to_string(), event.clone()));

        let mut events = self.events.lock().unwrap();
        let slot = events
            .iter_mut()
            .find(|e| e.id.as_deref() == Some(event_id))
            .ok_or(ApiError::NotFound)?;
        *slot = event.clone();

        Ok(slot.clone())
    }

    async fn delete_event(&self, _calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        self.check_failure()?;

        let mut events = self.events.lock().unwrap();
        let before = events.len();
        events.retain(|e| e.id.as_deref() != Some(event_id));
        if events.len() == before {
            return Err(ApiError::NotFound);
        }
        self.deleted.lock().unwrap().push(event_id.to_string());

        if self.gone_on_delete {
            return Err(ApiError::Gone);
        }

        Ok(())
    }
}

/// Hands out one fixed API, counting connections.
pub struct FakeConnector {
    api: Arc<dyn CalendarApi>,
    connections: AtomicUsize,
}

impl FakeConnector {
    pub fn new(api: Arc<dyn CalendarApi>) -> Self {
        FakeConnector {
            api,
            connections: AtomicUsize::new(0),
        }
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CalendarConnector for FakeConnector {
    async fn connect(&self, _credential: &Credential) -> Result<Arc<dyn CalendarApi>, AuthError> {
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(self.api.clone())
    }
}

pub fn test_secrets() -> SecretsSource {
    SecretsSource::Inline(ClientSecrets {
        client_id: "test-client.apps.googleusercontent.com".to_string(),
        client_secret: "test-secret".to_string(),
        redirect_uris: vec![],
    })
}

fn context(api: Arc<dyn CalendarApi>, consent: FakeConsent, timezone: Tz) -> CalendarContext {
    let authorizer = Authorizer::new(
        test_secrets(),
        Arc::new(MemoryTokenStore::default()),
        Arc::new(consent),
    );
    let factory = ClientFactory::new(authorizer, Arc::new(FakeConnector::new(api)));

    CalendarContext::new(factory, "primary", timezone)
}

/// A context on the `primary` calendar in UTC whose consent always succeeds.
pub fn context_with(api: Arc<dyn CalendarApi>) -> CalendarContext {
    context(api, FakeConsent::granting("test-refresh-token"), Tz::UTC)
}

pub fn context_in(api: Arc<dyn CalendarApi>, timezone: Tz) -> CalendarContext {
    context(api, FakeConsent::granting("test-refresh-token"), timezone)
}

/// A context whose authorization always fails.
pub fn failing_context() -> CalendarContext {
    context(
        Arc::new(FakeCalendar::default()),
        FakeConsent::denying(),
        Tz::UTC,
    )
}
