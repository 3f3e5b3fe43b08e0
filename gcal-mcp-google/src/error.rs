//! Error types for the Google backend.

use std::path::PathBuf;

use thiserror::Error;

/// Token store failures. Callers treat these as "no stored credential".
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse stored credential: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Token database error: {0}")]
    Database(#[from] tokio_rusqlite::Error),
}

/// Failures obtaining a usable credential or client.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Google client secrets unusable: {0}")]
    Secrets(String),

    #[error("Consent flow failed: {0}")]
    Consent(String),

    #[error("Failed to exchange tokens with Google: {0}")]
    TokenExchange(String),

    #[error("Credential for {0} has no refresh token")]
    MissingRefreshToken(String),
}

/// Calendar REST API failures.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not Found")]
    NotFound,

    #[error("Resource has been deleted")]
    Gone,

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(#[from] AuthError),

    #[error("Failed to decode provider response: {0}")]
    Decode(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}
