//! Static pre-check gate (component G) and cron-driven scheduler tick
//! (component H).
//!
//! The pre-check is a pure rule pipeline with no I/O; the tick is the only
//! piece of this crate that touches the graph runtime, and it does so
//! through [`outreach_graph::Runtime`] exactly as any other caller would.

mod error;
mod record_provider;
mod rules;
mod tick;

pub use error::{Result, SchedulerError};
pub use record_provider::{InMemoryRecordProvider, RecordProvider, SchedulableRecord};
pub use rules::{precheck, PrecheckDecision, PrecheckInput, ReasonCode, SchedulerRules};
pub use tick::{Outcome, RecordOutcome, Scheduler, TickSummary};
