//! Error types shared across gcal-mcp crates.

use thiserror::Error;

/// Errors from staging event data before it reaches the provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    #[error("Event has no {0} time")]
    MissingBoundary(&'static str),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Rejections raised by the tool dispatcher before any handler runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Tool {0} not found")]
    UnknownTool(String),

    #[error("Invalid arguments for tool {tool}: {reason}")]
    SchemaViolation { tool: String, reason: String },
}
