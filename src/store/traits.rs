//! `MessageStore` trait and the stored message shape.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// A single message header as the provider delivers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub value: String,
}

/// A stored message: provider id plus the raw header sequence.
///
/// Immutable once stored; created by ingestion and read-only to the rule
/// engine. Duplicate header names are kept as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: String,
    #[serde(default)]
    pub headers: Vec<Header>,
}

/// Backend-agnostic message persistence.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Insert or replace a message record, keyed by its provider id.
    async fn upsert(&self, record: &MessageRecord) -> Result<(), StoreError>;

    /// All stored messages, in primary-key order (stable within a run).
    async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError>;

    /// Number of stored messages.
    async fn count(&self) -> Result<u64, StoreError>;
}
