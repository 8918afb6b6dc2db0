//! Ingestion — pulls message metadata from the provider into the store.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{Error, MailError};
use crate::store::{MessageRecord, MessageStore};

/// Opaque mail-provider capability: list and fetch message metadata.
///
/// Authentication and transport live behind this trait; the ingest cycle
/// only sees ids and header records.
#[async_trait]
pub trait MailService: Send + Sync {
    /// Ids of the most recent messages, newest first, capped at `max_results`.
    async fn list_message_ids(&self, max_results: u32) -> Result<Vec<String>, MailError>;

    /// Fetch one message's metadata.
    async fn fetch_message(&self, id: &str) -> Result<MessageRecord, MailError>;
}

/// Outcome of one ingest cycle.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub listed: usize,
    pub stored: usize,
    pub failed: usize,
}

/// Run one ingest cycle: list ids, fetch each message, upsert into the store.
///
/// A listing failure aborts the cycle. Per-message fetch or store failures
/// are logged and skipped so one bad message never blocks the rest.
pub async fn sync_messages(
    mail: &dyn MailService,
    store: &dyn MessageStore,
    max_results: u32,
) -> Result<IngestReport, Error> {
    let ids = mail.list_message_ids(max_results).await?;
    let mut report = IngestReport {
        listed: ids.len(),
        ..Default::default()
    };
    info!(listed = report.listed, "Ingest cycle started");

    for id in &ids {
        let record = match mail.fetch_message(id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(message_id = %id, error = %e, "Failed to fetch message, skipping");
                report.failed += 1;
                continue;
            }
        };

        match store.upsert(&record).await {
            Ok(()) => {
                debug!(message_id = %record.id, "Message ingested");
                report.stored += 1;
            }
            Err(e) => {
                warn!(message_id = %record.id, error = %e, "Failed to store message, skipping");
                report.failed += 1;
            }
        }
    }

    info!(
        listed = report.listed,
        stored = report.stored,
        failed = report.failed,
        "Ingest cycle complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::store::Header;
    use std::sync::Mutex;

    struct FakeMail {
        ids: Vec<String>,
        /// Ids whose fetch fails.
        broken: Vec<String>,
    }

    #[async_trait]
    impl MailService for FakeMail {
        async fn list_message_ids(&self, max_results: u32) -> Result<Vec<String>, MailError> {
            Ok(self.ids.iter().take(max_results as usize).cloned().collect())
        }

        async fn fetch_message(&self, id: &str) -> Result<MessageRecord, MailError> {
            if self.broken.iter().any(|b| b == id) {
                return Err(MailError::Provider {
                    status: 404,
                    message: "not found".into(),
                });
            }
            Ok(MessageRecord {
                id: id.to_string(),
                headers: vec![Header {
                    name: "Subject".into(),
                    value: format!("subject of {id}"),
                }],
            })
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<MessageRecord>>,
    }

    #[async_trait]
    impl MessageStore for MemoryStore {
        async fn upsert(&self, record: &MessageRecord) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|r| r.id != record.id);
            records.push(record.clone());
            Ok(())
        }

        async fn list_all(&self) -> Result<Vec<MessageRecord>, StoreError> {
            Ok(self.records.lock().unwrap().clone())
        }

        async fn count(&self) -> Result<u64, StoreError> {
            Ok(self.records.lock().unwrap().len() as u64)
        }
    }

    #[tokio::test]
    async fn syncs_all_listed_messages() {
        let mail = FakeMail {
            ids: vec!["m1".into(), "m2".into()],
            broken: vec![],
        };
        let store = MemoryStore::default();

        let report = sync_messages(&mail, &store, 10).await.unwrap();
        assert_eq!(
            report,
            IngestReport {
                listed: 2,
                stored: 2,
                failed: 0
            }
        );
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn fetch_failure_skips_only_that_message() {
        let mail = FakeMail {
            ids: vec!["m1".into(), "m2".into(), "m3".into()],
            broken: vec!["m2".into()],
        };
        let store = MemoryStore::default();

        let report = sync_messages(&mail, &store, 10).await.unwrap();
        assert_eq!(report.stored, 2);
        assert_eq!(report.failed, 1);
        let ids: Vec<String> = store
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["m1", "m3"]);
    }

    #[tokio::test]
    async fn respects_max_results_cap() {
        let mail = FakeMail {
            ids: (0..20).map(|i| format!("m{i}")).collect(),
            broken: vec![],
        };
        let store = MemoryStore::default();

        let report = sync_messages(&mail, &store, 5).await.unwrap();
        assert_eq!(report.listed, 5);
        assert_eq!(report.stored, 5);
    }

    #[tokio::test]
    async fn resync_replaces_instead_of_duplicating() {
        let mail = FakeMail {
            ids: vec!["m1".into()],
            broken: vec![],
        };
        let store = MemoryStore::default();

        sync_messages(&mail, &store, 10).await.unwrap();
        sync_messages(&mail, &store, 10).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
