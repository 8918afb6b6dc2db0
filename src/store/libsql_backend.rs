//! libSQL store — async `MessageStore` implementation.
//!
//! Supports local file and in-memory databases. The header sequence is
//! persisted as a JSON column so the stored record round-trips exactly as
//! the provider delivered it, duplicate names included.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::{Header, MessageRecord, MessageStore};

/// libSQL message store.
///
/// Holds a single connection reused for all operations;
/// `libsql::Connection` is safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Open(format!("Failed to create database directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to open libSQL database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run(&store.conn).await?;
        info!(path = %path.display(), "Message store opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Open(format!("Failed to create in-memory database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Open(format!("Failed to create connection: {e}")))?;

        let store = Self {
            db: Arc::new(db),
            conn,
        };
        migrations::run(&store.conn).await?;
        Ok(store)
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn row_to_record(row: &libsql::Row) -> Result<MessageRecord, StoreError> {
    let id: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("list_all row parse: {e}")))?;
    let headers_json: String = row
        .get(1)
        .map_err(|e| StoreError::Query(format!("list_all row parse: {e}")))?;
    let headers: Vec<Header> = serde_json::from_str(&headers_json)
        .map_err(|e| StoreError::Serialization(format!("headers column for '{id}': {e}")))?;
    Ok(MessageRecord { id, headers })
}

#[async_trait]
impl MessageStore for LibSqlStore {
    async fn upsert(&self, record: &MessageRecord) -> Result<(), StoreError> {
        let headers_json = serde_json::to_string(&record.headers)
            .map_err(|e| StoreError::Serialization(format!("headers for '{}': {e}", record.id)))?;

        // The provider id is the primary key, so re-ingesting replaces.
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO messages (id, headers) VALUES (?1, ?2)",
                params![record.id.as_str(), headers_json],
            )
            .await
            .map_err(|e| StoreError::Query(format!("upsert: {e}")))?;

        debug!(message_id = %record.id, headers = record.headers.len(), "Message stored");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT id, headers FROM messages ORDER BY id", ())
            .await
            .map_err(|e| StoreError::Query(format!("list_all: {e}")))?;

        let mut records = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => records.push(row_to_record(&row)?),
                Ok(None) => break,
                Err(e) => return Err(StoreError::Query(format!("list_all: {e}"))),
            }
        }
        Ok(records)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let mut rows = self
            .conn()
            .query("SELECT COUNT(*) FROM messages", ())
            .await
            .map_err(|e| StoreError::Query(format!("count: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| StoreError::Query(format!("count row parse: {e}")))?;
                Ok(count as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(StoreError::Query(format!("count: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, headers: &[(&str, &str)]) -> MessageRecord {
        MessageRecord {
            id: id.into(),
            headers: headers
                .iter()
                .map(|(name, value)| Header {
                    name: (*name).into(),
                    value: (*value).into(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn upsert_and_list_roundtrip() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let msg = record("m1", &[("From", "a@b.com"), ("Subject", "hi")]);
        store.upsert(&msg).await.unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all, vec![msg]);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_on_same_id() {
        let store = LibSqlStore::new_memory().await.unwrap();
        store
            .upsert(&record("m1", &[("Subject", "first")]))
            .await
            .unwrap();
        store
            .upsert(&record("m1", &[("Subject", "second")]))
            .await
            .unwrap();

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].headers[0].value, "second");
    }

    #[tokio::test]
    async fn list_all_orders_by_id() {
        let store = LibSqlStore::new_memory().await.unwrap();
        for id in ["m3", "m1", "m2"] {
            store.upsert(&record(id, &[])).await.unwrap();
        }

        let ids: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let store = LibSqlStore::new_memory().await.unwrap();
        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn local_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mailrules.db");

        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store
                .upsert(&record("m1", &[("Subject", "kept")]))
                .await
                .unwrap();
        }

        let reopened = LibSqlStore::new_local(&path).await.unwrap();
        let all = reopened.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "m1");
    }
}
