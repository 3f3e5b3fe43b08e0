//! Access tokens for the Calendar REST client.
//!
//! A `TokenSource` hands out the current bearer token and exchanges the
//! refresh token for a new one once it has expired.

use chrono::{DateTime, Duration, Utc};
use gcal_mcp_core::Credential;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::AuthError;

pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Lifetime assumed for an access token whose expiry is unknown.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Refresh this long before the provider would reject the token.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct Bearer {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Bearer {
    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

pub struct TokenSource {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    current: Mutex<Option<Bearer>>,
}

impl TokenSource {
    /// Seeded with the credential's access token, if it carries one.
    pub fn new(http: reqwest::Client, token_url: impl Into<String>, credential: &Credential) -> Self {
        let current = credential.access_token.as_ref().map(|access_token| Bearer {
            access_token: access_token.clone(),
            expires_at: credential
                .access_token_expires_at
                .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_LIFETIME_SECS)),
        });

        TokenSource {
            http,
            token_url: token_url.into(),
            client_id: credential.client_id.clone(),
            client_secret: credential.client_secret.clone(),
            refresh_token: credential.refresh_token.clone(),
            current: Mutex::new(current),
        }
    }

    /// A bearer token valid for at least the expiry margin. Concurrent
    /// callers share one refresh.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let mut current = self.current.lock().await;

        if let Some(bearer) = current.as_ref().filter(|bearer| !bearer.is_expired()) {
            return Ok(bearer.access_token.clone());
        }

        let bearer = self.refresh().await?;
        let access_token = bearer.access_token.clone();
        *current = Some(bearer);

        Ok(access_token)
    }

    /// Forget the current token so the next request refreshes first.
    pub async fn invalidate(&self) {
        self.current.lock().await.take();
    }

    async fn refresh(&self) -> Result<Bearer, AuthError> {
        if self.refresh_token.is_empty() {
            return Err(AuthError::MissingRefreshToken(self.client_id.clone()));
        }

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", self.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenExchange(format!("{}: {}", status, body)));
        }

        let tokens: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        tracing::debug!(
            client_id = %self.client_id,
            expires_in = tokens.expires_in,
            "Refreshed access token"
        );

        Ok(Bearer {
            access_token: tokens.access_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
        })
    }
}
