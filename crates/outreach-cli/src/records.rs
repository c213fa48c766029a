//! Deserializable stand-in for [`outreach_scheduler::SchedulableRecord`],
//! whose fields (a `chrono::DateTime<Utc>` with no default) aren't `Deserialize`
//! on the scheduler side — this is the wire shape the `tick` subcommand reads
//! from a `--records` file and converts.

use anyhow::Result;
use chrono::{DateTime, Utc};
use outreach_graph::{Contact, Record};
use outreach_scheduler::SchedulableRecord;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInput {
    pub record: Record,
    #[serde(default)]
    pub contact: Option<Contact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub action_count: u32,
    #[serde(default)]
    pub last_action_at: Option<DateTime<Utc>>,
}

impl From<RecordInput> for SchedulableRecord {
    fn from(input: RecordInput) -> Self {
        SchedulableRecord {
            record: input.record,
            contact: input.contact,
            created_at: input.created_at,
            updated_at: input.updated_at,
            action_count: input.action_count,
            last_action_at: input.last_action_at,
        }
    }
}

pub fn load_records(path: impl AsRef<Path>) -> Result<Vec<SchedulableRecord>> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let inputs: Vec<RecordInput> = serde_json::from_str(&raw)?;
    Ok(inputs.into_iter().map(Into::into).collect())
}
