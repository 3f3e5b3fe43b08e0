//! Event operations behind the calendar tools.
//!
//! Each command acquires a client handle from the context, makes its
//! provider calls and reduces the result to a `ToolOutcome`. Provider errors
//! are reported, never retried.

pub mod create_event;
pub mod delete_event;
pub mod get_event;
pub mod list_events;
pub mod update_event;

use crate::context::CalendarContext;
use crate::outcome::ToolOutcome;
use crate::session::ClientHandle;

/// The context's client handle, or the authentication-failed outcome.
async fn authed_client(ctx: &CalendarContext) -> Result<ClientHandle, ToolOutcome> {
    ctx.client().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize Google Calendar client");
        ToolOutcome::AuthFailure
    })
}
