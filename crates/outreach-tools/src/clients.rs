//! Capability traits for the external collaborators spec.md §6 enumerates:
//! the email/phone providers and the record store. The core never talks to
//! these directly — it only ever sees the five named tools through
//! [`crate::registry::ToolRegistry`]; these traits are what a deployment
//! plugs in behind that registry.

use crate::error::Result;
use async_trait::async_trait;
use outreach_graph::{Message, Record, RecordStatus};

#[derive(Debug, Clone)]
pub struct EmailReceipt {
    pub message_id: String,
}

#[derive(Debug, Clone)]
pub struct CallReceipt {
    pub call_id: String,
}

/// `SendEmail({to, subject, body}) -> {messageId}` (spec.md §6).
#[async_trait]
pub trait EmailGateway: Send + Sync {
    async fn send_email(&self, to: Option<&str>, subject: &str, body: &str) -> Result<EmailReceipt>;
}

/// `InitiateCall({phone, talkingPoints}) -> {callId}` (spec.md §6).
#[async_trait]
pub trait CallGateway: Send + Sync {
    async fn initiate_call(&self, phone: Option<&str>, talking_points: &[String]) -> Result<CallReceipt>;
}

/// `GetRecord(id) -> record?` / `UpdateRecordStatus(id, status) -> ok`
/// (spec.md §6), plus the conversation-history read the required
/// `getRecordHistory` handler needs. The engine never mutates a record
/// directly (spec.md §3): every write flows through this trait.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_record(&self, id: &str) -> Result<Option<Record>>;
    async fn get_record_history(&self, id: &str) -> Result<Vec<Message>>;
    async fn update_record_status(&self, id: &str, status: RecordStatus) -> Result<()>;
}
