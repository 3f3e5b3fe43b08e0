use std::path::Path;

use async_trait::async_trait;
use gcal_mcp_core::Credential;
use rusqlite::OptionalExtension;
use tokio_rusqlite::Connection;

use super::TokenStore;
use crate::error::StoreError;

/// Keyed credential collection in SQLite, one row per client id.
pub struct SqliteTokenStore {
    db: Connection,
}

impl SqliteTokenStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let db = Connection::open(path.to_path_buf()).await?;
        Self::migrate(&db).await?;

        Ok(SqliteTokenStore { db })
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        let db = Connection::open_in_memory().await?;
        Self::migrate(&db).await?;

        Ok(SqliteTokenStore { db })
    }

    async fn migrate(db: &Connection) -> Result<(), StoreError> {
        db.call(|conn| {
            conn.execute(
                "CREATE TABLE IF NOT EXISTS credentials (
                    client_id TEXT PRIMARY KEY,
                    record TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                )",
                [],
            )?;
            Ok(())
        })
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, key: &str) -> Result<Option<Credential>, StoreError> {
        let key = key.to_string();

        let record: Option<String> = self
            .db
            .call(move |conn| {
                let record = conn
                    .query_row(
                        "SELECT record FROM credentials WHERE client_id = ?1",
                        [&key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(record)
            })
            .await?;

        match record {
            Some(record) => Ok(Some(serde_json::from_str(&record)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, credential: &Credential) -> Result<(), StoreError> {
        let key = key.to_string();
        let record = serde_json::to_string(credential)?;
        let updated_at = chrono::Utc::now().to_rfc3339();

        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO credentials (client_id, record, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(client_id) DO UPDATE SET record = excluded.record, updated_at = excluded.updated_at",
                    (&key, &record, &updated_at),
                )?;
                Ok(())
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_is_absent() {
        let store = SqliteTokenStore::open_in_memory().await.unwrap();

        assert!(store.get("client-a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = SqliteTokenStore::open_in_memory().await.unwrap();
        let credential = Credential::authorized_user("client-a", "secret", "r1");

        store.put("client-a", &credential).await.unwrap();

        assert_eq!(store.get("client-a").await.unwrap(), Some(credential));
    }

    #[tokio::test]
    async fn test_keys_are_independent_and_overwritten() {
        let store = SqliteTokenStore::open_in_memory().await.unwrap();

        store
            .put("client-a", &Credential::authorized_user("client-a", "s", "r1"))
            .await
            .unwrap();
        store
            .put("client-b", &Credential::authorized_user("client-b", "s", "r9"))
            .await
            .unwrap();
        store
            .put("client-a", &Credential::authorized_user("client-a", "s", "r2"))
            .await
            .unwrap();

        assert_eq!(store.get("client-a").await.unwrap().unwrap().refresh_token, "r2");
        assert_eq!(store.get("client-b").await.unwrap().unwrap().refresh_token, "r9");
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.db");

        {
            let store = SqliteTokenStore::open(&path).await.unwrap();
            store
                .put("client-a", &Credential::authorized_user("client-a", "s", "r1"))
                .await
                .unwrap();
        }

        let store = SqliteTokenStore::open(&path).await.unwrap();
        assert_eq!(store.get("client-a").await.unwrap().unwrap().refresh_token, "r1");
    }
}
