//! Credential persistence.
//!
//! Two interchangeable backends behind one contract:
//! - `FileTokenStore`: a single-record JSON file (`token.json`)
//! - `SqliteTokenStore`: a keyed collection, one row per client id

mod file;
mod sqlite;

pub use file::FileTokenStore;
pub use sqlite::SqliteTokenStore;

use async_trait::async_trait;
use gcal_mcp_core::Credential;

use crate::error::StoreError;

/// Point lookup and insert-or-overwrite of credentials keyed by client id.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Credential>, StoreError>;

    async fn put(&self, key: &str, credential: &Credential) -> Result<(), StoreError>;
}
