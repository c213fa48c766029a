//! In-memory reference implementations of the gateway traits, for the CLI's
//! `tick`/`run` demo harness and for tests that need a real (if trivial)
//! [`RecordStore`] rather than a fully scripted one.

use crate::clients::{CallGateway, CallReceipt, EmailGateway, EmailReceipt, RecordStore};
use crate::error::Result;
use async_trait::async_trait;
use outreach_graph::{Message, Record, RecordStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Logs the send and hands back a synthetic id. Never fails — a deployment
/// swaps this for a real SMTP/API-backed [`EmailGateway`].
#[derive(Default)]
pub struct LoggingEmailGateway {
    counter: AtomicU64,
}

#[async_trait]
impl EmailGateway for LoggingEmailGateway {
    async fn send_email(&self, to: Option<&str>, subject: &str, _body: &str) -> Result<EmailReceipt> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        tracing::info!(to, subject, "sending email (stub gateway)");
        Ok(EmailReceipt {
            message_id: format!("stub-email-{n}"),
        })
    }
}

/// Logs the dial and hands back a synthetic id. Never fails — a deployment
/// swaps this for a real telephony-backed [`CallGateway`].
#[derive(Default)]
pub struct LoggingCallGateway {
    counter: AtomicU64,
}

#[async_trait]
impl CallGateway for LoggingCallGateway {
    async fn initiate_call(&self, phone: Option<&str>, talking_points: &[String]) -> Result<CallReceipt> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        tracing::info!(phone, points = talking_points.len(), "initiating call (stub gateway)");
        Ok(CallReceipt {
            call_id: format!("stub-call-{n}"),
        })
    }
}

/// Keeps records and their conversation history in a process-local map.
/// Seeded explicitly by the caller (CLI/tests); the engine never deletes or
/// creates records, only mutates status through this trait.
#[derive(Default)]
pub struct InMemoryRecordStore {
    records: RwLock<HashMap<String, Record>>,
    history: RwLock<HashMap<String, Vec<Message>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, record: Record) {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    pub async fn append_history(&self, record_id: &str, messages: Vec<Message>) {
        self.history
            .write()
            .await
            .entry(record_id.to_string())
            .or_default()
            .extend(messages);
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_record(&self, id: &str) -> Result<Option<Record>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn get_record_history(&self, id: &str) -> Result<Vec<Message>> {
        Ok(self.history.read().await.get(id).cloned().unwrap_or_default())
    }

    async fn update_record_status(&self, id: &str, status: RecordStatus) -> Result<()> {
        if let Some(record) = self.records.write().await.get_mut(id) {
            record.status = status;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    #[tokio::test]
    async fn seeded_record_round_trips_and_status_updates() {
        let store = InMemoryRecordStore::new();
        store
            .seed(Record {
                id: "r1".into(),
                title: "Invoice".into(),
                status: RecordStatus::Open,
                priority: None,
                record_type: "invoice".into(),
                metadata: Map::new(),
            })
            .await;

        let record = store.get_record("r1").await.unwrap().unwrap();
        assert_eq!(record.status, RecordStatus::Open);

        store.update_record_status("r1", RecordStatus::Done).await.unwrap();
        let record = store.get_record("r1").await.unwrap().unwrap();
        assert_eq!(record.status, RecordStatus::Done);
    }

    #[tokio::test]
    async fn missing_record_returns_none() {
        let store = InMemoryRecordStore::new();
        assert!(store.get_record("ghost").await.unwrap().is_none());
    }
}
