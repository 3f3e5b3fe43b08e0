//! Calendar v3 REST client for the five event endpoints this server uses.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::google_event::GoogleEvent;
use crate::token::TokenSource;

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Parameters of an `events.list` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub time_min: String,
    /// Passed through as given, without range checks
    pub max_results: Option<serde_json::Number>,
    pub single_events: bool,
    pub order_by: Option<String>,
}

#[async_trait]
pub trait CalendarApi: Send + Sync {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError>;

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GoogleEvent>, ApiError>;

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<GoogleEvent, ApiError>;

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError>;

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError>;
}

pub struct GoogleCalendarApi {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<TokenSource>,
}

#[derive(Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl GoogleCalendarApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, tokens: Arc<TokenSource>) -> Self {
        GoogleCalendarApi {
            http,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// `{base}/calendars/{calendar_id}/events[/{event_id}]`, each segment
    /// percent-encoded.
    fn events_url(&self, calendar_id: &str, event_id: Option<&str>) -> Result<url::Url, ApiError> {
        let mut url = url::Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?;
            segments.pop_if_empty().push("calendars").push(calendar_id).push("events");
            if let Some(event_id) = event_id {
                segments.push(event_id);
            }
        }

        Ok(url)
    }

    /// A request carrying a current access token, refreshed first if it
    /// has expired.
    async fn request(&self, method: Method, url: url::Url) -> Result<RequestBuilder, ApiError> {
        let access_token = self.tokens.access_token().await?;

        Ok(self.http.request(method, url).bearer_auth(access_token))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::UNAUTHORIZED {
            // Next request refreshes first
            self.tokens.invalidate().await;
        }

        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            StatusCode::GONE => Err(ApiError::Gone),
            _ => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&body)
                    .map(|b| b.error.message)
                    .unwrap_or_else(|_| {
                        if body.is_empty() {
                            status.to_string()
                        } else {
                            body
                        }
                    });

                tracing::debug!(status = status.as_u16(), %message, "Calendar API error");

                Err(ApiError::Status {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Integral floats (`5.0`) go out as integers; anything else as given.
fn query_number(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        _ => number.to_string(),
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendarApi {
    async fn insert_event(
        &self,
        calendar_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError> {
        let url = self.events_url(calendar_id, None)?;
        let response = self.send(self.request(Method::POST, url).await?.json(event)).await?;

        Self::decode(response).await
    }

    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListQuery,
    ) -> Result<Vec<GoogleEvent>, ApiError> {
        let url = self.events_url(calendar_id, None)?;

        let mut params = vec![
            ("timeMin", query.time_min.clone()),
            ("singleEvents", query.single_events.to_string()),
        ];
        if let Some(max_results) = &query.max_results {
            params.push(("maxResults", query_number(max_results)));
        }
        if let Some(order_by) = &query.order_by {
            params.push(("orderBy", order_by.clone()));
        }

        let response = self
            .send(self.request(Method::GET, url).await?.query(&params))
            .await?;
        let list: EventList = Self::decode(response).await?;

        Ok(list.items)
    }

    async fn get_event(&self, calendar_id: &str, event_id: &str) -> Result<GoogleEvent, ApiError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let response = self.send(self.request(Method::GET, url).await?).await?;

        Self::decode(response).await
    }

    async fn update_event(
        &self,
        calendar_id: &str,
        event_id: &str,
        event: &GoogleEvent,
    ) -> Result<GoogleEvent, ApiError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        let response = self.send(self.request(Method::PUT, url).await?.json(event)).await?;

        Self::decode(response).await
    }

    async fn delete_event(&self, calendar_id: &str, event_id: &str) -> Result<(), ApiError> {
        let url = self.events_url(calendar_id, Some(event_id))?;
        self.send(self.request(Method::DELETE, url).await?).await?;

        Ok(())
    }
}
