//! Shared thread state and its reducers.
//!
//! `ThreadState` is a concrete struct rather than a generic JSON-channel
//! system: every node returns a `PartialThreadState`, and `ThreadState::merge`
//! is the single place that knows how each field combines. Scalars are
//! last-write-wins; `messages` is append-only.

use crate::messages::{Message, MessagePatch};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Open,
    Done,
    Blocked,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// The unit of work the engine is acting on. Mutated only through tool
/// effects (`updateRecordStatus`) or terminal nodes, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Optional associate of a record. Immutable from the engine's perspective.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_channel: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Running,
    Completed,
    WaitingHuman,
}

/// Last outbound channel used by a send-effect node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Channel {
    Email,
    Phone,
    Sms,
    Whatsapp,
}

/// The live per-record-per-workflow working state threaded through graph
/// nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadState {
    pub record: Record,
    pub contact: Option<Contact>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_channel: Option<Channel>,
    #[serde(default)]
    pub waiting_for_response: bool,
    pub workflow_status: WorkflowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node: Option<String>,
}

impl ThreadState {
    pub fn new(record: Record, contact: Option<Contact>) -> Self {
        Self {
            record,
            contact,
            messages: Vec::new(),
            attempts: 0,
            last_channel: None,
            waiting_for_response: false,
            workflow_status: WorkflowStatus::Running,
            current_node: None,
            next_node: None,
        }
    }

    /// Apply a partial update produced by a node, returning the next state.
    /// `partial` is never aliased into the result: every field that is
    /// replaced or appended is cloned or moved, never referenced.
    pub fn merge(&self, partial: PartialThreadState) -> ThreadState {
        let mut messages = self.messages.clone();
        if let Some(patch) = partial.messages {
            messages.extend(patch.into_vec());
        }

        ThreadState {
            record: partial.record.unwrap_or_else(|| self.record.clone()),
            contact: partial.contact.unwrap_or_else(|| self.contact.clone()),
            messages,
            attempts: partial.attempts.unwrap_or(self.attempts),
            last_channel: partial.last_channel.unwrap_or(self.last_channel),
            waiting_for_response: partial
                .waiting_for_response
                .unwrap_or(self.waiting_for_response),
            workflow_status: partial.workflow_status.unwrap_or(self.workflow_status),
            current_node: partial.current_node.or_else(|| self.current_node.clone()),
            next_node: partial.next_node.or_else(|| self.next_node.clone()),
        }
    }
}

/// What a node returns: only the fields it wants to change. `None` means
/// "keep the current value" for every field except `messages`, where `None`
/// means "append nothing".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PartialThreadState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Option<Contact>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<MessagePatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_channel: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waiting_for_response: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_status: Option<WorkflowStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_node: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node: Option<String>,
}

impl PartialThreadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_current_node(mut self, node: impl Into<String>) -> Self {
        self.current_node = Some(node.into());
        self
    }

    pub fn with_next_node(mut self, node: impl Into<String>) -> Self {
        self.next_node = Some(node.into());
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages = Some(MessagePatch::Single(message));
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(MessagePatch::Many(messages));
        self
    }

    /// Escape hatch for setting fields the dedicated builder methods don't
    /// cover, without breaking the fluent chain.
    pub fn also(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

/// Sentinel `nextNode` value signaling the graph should terminate.
pub const END: &str = "__end__";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Role;

    fn sample_state() -> ThreadState {
        ThreadState::new(
            Record {
                id: "r1".into(),
                title: "Invoice 1001".into(),
                status: RecordStatus::Open,
                priority: Some(Priority::High),
                record_type: "invoice".into(),
                metadata: HashMap::new(),
            },
            None,
        )
    }

    #[test]
    fn scalar_fields_are_last_write_wins() {
        let state = sample_state();
        let partial = PartialThreadState::new().with_next_node("sendEmail");
        let next = state.merge(partial);
        assert_eq!(next.next_node.as_deref(), Some("sendEmail"));
        assert_eq!(next.attempts, 0);
    }

    #[test]
    fn unset_scalar_fields_keep_previous_value() {
        let state = sample_state().merge(
            PartialThreadState::new()
                .with_next_node("sendEmail")
                .with_message(Message::assistant("ok")),
        );
        let next = state.merge(PartialThreadState::new());
        assert_eq!(next.next_node.as_deref(), Some("sendEmail"));
        assert_eq!(next.messages.len(), 1);
    }

    #[test]
    fn messages_append_single_and_many() {
        let state = sample_state();
        let state = state.merge(PartialThreadState::new().with_message(Message::user("hi")));
        assert_eq!(state.messages.len(), 1);

        let state = state.merge(
            PartialThreadState::new()
                .with_messages(vec![Message::assistant("a"), Message::tool("b")]),
        );
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.messages[0].role, Role::User);
        assert_eq!(state.messages[2].role, Role::Tool);
    }

    #[test]
    fn merge_does_not_alias_partial_messages() {
        let state = sample_state();
        let mut partial = PartialThreadState::new();
        let patch = vec![Message::user("hi")];
        partial.messages = Some(MessagePatch::Many(patch.clone()));
        let next = state.merge(partial);
        assert_eq!(next.messages.len(), patch.len());
    }
}
