//! Message types threaded through [`crate::state::ThreadState`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// One entry in a thread's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            channel: None,
            channel_message_id: None,
            metadata: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self::new(Role::Tool, content)
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Zero or more messages produced by a single node step. A node returns
/// `Single` for the common case and `Many` when it needs to append more than
/// one entry (a node never needs to replace history, only extend it).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessagePatch {
    Single(Message),
    Many(Vec<Message>),
}

impl MessagePatch {
    pub fn into_vec(self) -> Vec<Message> {
        match self {
            MessagePatch::Single(m) => vec![m],
            MessagePatch::Many(ms) => ms,
        }
    }
}

/// Rewrites `tool`-role history entries to `user`-role with a
/// `[System Action] ` prefix before submission to an LLM.
///
/// This is domain policy (see analyze-node contract), not something the LLM
/// provider requires — preserved verbatim rather than folded into the
/// client.
pub fn rewrite_tool_messages_for_llm(history: &[Message]) -> Vec<Message> {
    history
        .iter()
        .map(|m| {
            if m.role == Role::Tool {
                let mut rewritten = m.clone();
                rewritten.role = Role::User;
                rewritten.content = format!("[System Action] {}", m.content);
                rewritten
            } else {
                m.clone()
            }
        })
        .collect()
}
