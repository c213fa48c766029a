//! The application-supplied source of eligible records. Spec.md §4.8 treats
//! the database query ("eligible records filtered by enabledStatuses and
//! capped by batchSize, ordered oldest-updated first") as an external
//! collaborator's responsibility; this trait is the seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outreach_graph::{Contact, Record, RecordStatus};

/// Everything the static pre-check and the graph runtime need about one
/// record for a single tick.
#[derive(Debug, Clone)]
pub struct SchedulableRecord {
    pub record: Record,
    pub contact: Option<Contact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Count of outbound send-effect nodes run against this record so far.
    pub action_count: u32,
    /// Timestamp of the most recent action-channel effect
    /// ({EMAIL, PHONE, SMS, WHATSAPP}), or `None` if never acted on.
    pub last_action_at: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Lists up to `batch_size` records whose status is in
    /// `enabled_statuses`, ordered oldest-`updated_at` first.
    async fn list_eligible(
        &self,
        enabled_statuses: &[RecordStatus],
        batch_size: u32,
    ) -> crate::error::Result<Vec<SchedulableRecord>>;
}

/// Process-local [`RecordProvider`] for tests and the CLI's `tick` demo.
/// Records are seeded explicitly; eligibility ordering mirrors what a real
/// query would return (oldest `updated_at` first).
#[derive(Default)]
pub struct InMemoryRecordProvider {
    records: tokio::sync::RwLock<Vec<SchedulableRecord>>,
}

impl InMemoryRecordProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed(&self, record: SchedulableRecord) {
        self.records.write().await.push(record);
    }
}

#[async_trait]
impl RecordProvider for InMemoryRecordProvider {
    async fn list_eligible(
        &self,
        enabled_statuses: &[RecordStatus],
        batch_size: u32,
    ) -> crate::error::Result<Vec<SchedulableRecord>> {
        let mut matching: Vec<SchedulableRecord> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| enabled_statuses.contains(&r.record.status))
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.updated_at);
        matching.truncate(batch_size as usize);
        Ok(matching)
    }
}
