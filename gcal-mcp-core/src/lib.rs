//! Core types for gcal-mcp.
//!
//! This crate provides the types shared by the server binary and the
//! Google provider crate:
//! - `Credential` for the OAuth record the token stores persist
//! - `EventTime` for staging all-day vs timed event boundaries
//! - `protocol` module for the MCP (JSON-RPC over stdio) messages

pub mod credential;
pub mod error;
pub mod event;
pub mod protocol;

pub use credential::{Credential, CredentialKind};
pub use error::{CoreError, CoreResult, DispatchError};
pub use event::EventTime;
