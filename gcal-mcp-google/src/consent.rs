//! Interactive OAuth consent (installed-app loopback flow).

use async_trait::async_trait;
use chrono::{Duration, Utc};
use gcal_mcp_core::Credential;
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::app_config::ClientSecrets;
use crate::error::AuthError;

pub const DEFAULT_REDIRECT_PORT: u16 = 8085;

/// The human-in-the-loop step that turns client secrets into a credential.
#[async_trait]
pub trait ConsentFlow: Send + Sync {
    async fn run(&self, secrets: &ClientSecrets, scopes: &[&str]) -> Result<Credential, AuthError>;
}

/// Opens the Google consent page and waits for the redirect on localhost.
pub struct BrowserConsent {
    redirect_port: u16,
}

impl BrowserConsent {
    pub fn new(redirect_port: u16) -> Self {
        BrowserConsent { redirect_port }
    }

    fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/callback", self.redirect_port)
    }

    fn redirect_address(&self) -> String {
        format!("127.0.0.1:{}", self.redirect_port)
    }
}

impl Default for BrowserConsent {
    fn default() -> Self {
        Self::new(DEFAULT_REDIRECT_PORT)
    }
}

#[async_trait]
impl ConsentFlow for BrowserConsent {
    async fn run(&self, secrets: &ClientSecrets, scopes: &[&str]) -> Result<Credential, AuthError> {
        let scopes: Vec<String> = scopes.iter().map(|s| s.to_string()).collect();

        let mut client = Client::new(
            secrets.client_id.clone(),
            secrets.client_secret.clone(),
            self.redirect_uri(),
            String::new(),
            String::new(),
        );

        let auth_url = client.user_consent_url(&scopes);

        // stdout belongs to the MCP transport, so the prompt goes to stderr
        eprintln!("\nOpen this URL in your browser to authorize Google Calendar access:\n");
        eprintln!("{}\n", auth_url);

        if open::that(&auth_url).is_err() {
            eprintln!("(Could not open browser automatically, please copy the URL above)");
        }

        let callback = wait_for_callback(&self.redirect_address()).await?;

        tracing::info!("Received authorization code, exchanging for tokens");

        let tokens = client
            .get_access_token(&callback.code, &callback.state)
            .await
            .map_err(|e| AuthError::TokenExchange(e.to_string()))?;

        Ok(Credential::authorized_user(
            secrets.client_id.clone(),
            secrets.client_secret.clone(),
            tokens.refresh_token,
        )
        .with_access_token(tokens.access_token)
        .with_expiry(Utc::now() + Duration::seconds(tokens.expires_in)))
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Callback {
    code: String,
    state: String,
}

/// Pull `code`/`state` out of the callback request target, or the
/// provider's `error` if the user declined.
fn parse_callback(request_line: &str) -> Result<Callback, AuthError> {
    let target = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| AuthError::Consent("Invalid HTTP request on callback".to_string()))?;

    let url = url::Url::parse(&format!("http://localhost{}", target))
        .map_err(|e| AuthError::Consent(format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        return Err(AuthError::Consent(format!("authorization denied: {}", error)));
    }

    let code = param("code").ok_or_else(|| AuthError::Consent("No code in callback".to_string()))?;
    let state =
        param("state").ok_or_else(|| AuthError::Consent("No state in callback".to_string()))?;

    Ok(Callback { code, state })
}

async fn wait_for_callback(address: &str) -> Result<Callback, AuthError> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| AuthError::Consent(format!("Failed to bind {}: {}", address, e)))?;

    tracing::info!(address, "Waiting for OAuth callback");

    let (stream, _) = listener
        .accept()
        .await
        .map_err(|e| AuthError::Consent(format!("Failed to accept OAuth callback: {}", e)))?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .map_err(|e| AuthError::Consent(format!("Failed to read OAuth callback: {}", e)))?;

    let callback = parse_callback(&request_line);

    let body = match &callback {
        Ok(_) => "<h1>Authorization successful!</h1>\
            <p>You can close this window and return to your MCP client.</p>",
        Err(_) => "<h1>Authorization failed.</h1>\
            <p>Check the server log for details.</p>",
    };

    let response = format!(
        "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>{}</body></html>",
        body
    );

    let mut stream = reader.into_inner();
    if let Err(e) = stream.write_all(response.as_bytes()).await {
        tracing::warn!(error = %e, "Failed to answer OAuth callback");
    }
    let _ = stream.flush().await;

    callback
}
