//! Google Calendar backend for gcal-mcp.
//!
//! Credential lifecycle (client secrets, token stores, consent, authorizer),
//! the Calendar REST client and the event operations exposed as tools.

pub mod api;
pub mod app_config;
pub mod authorizer;
pub mod commands;
pub mod consent;
pub mod context;
pub mod error;
pub mod google_event;
pub mod outcome;
pub mod session;
pub mod store;
pub mod token;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use context::CalendarContext;
pub use outcome::ToolOutcome;
