//! Cron-driven scheduler tick (component H).
//!
//! One tick: list eligible records, run the static pre-check, and for every
//! record that proceeds, drive the graph runtime one step further (to its
//! next interrupt or completion), aggregating per-record outcomes. The
//! scheduler is process-wide: at most one tick per workflow may be in
//! flight concurrently (spec.md §4.8), enforced the same way the checkpoint
//! crate enforces per-thread exclusivity — a keyed lock, not a global one.

use crate::error::{Result, SchedulerError};
use crate::record_provider::{RecordProvider, SchedulableRecord};
use crate::rules::{precheck, PrecheckInput, ReasonCode, SchedulerRules};
use chrono::{DateTime, Utc};
use outreach_checkpoint::CheckpointSaver;
use outreach_graph::{RunOutcome, Runtime, ThreadState};
use std::sync::Arc;
use tokio::sync::Mutex;

/// What happened to one record during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    ActionTaken,
    SkippedStatic,
    SkippedAi,
    Error,
}

#[derive(Debug, Clone)]
pub struct RecordOutcome {
    pub record_id: String,
    pub outcome: Outcome,
    pub reason: Option<ReasonCode>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct TickSummary {
    pub outcomes: Vec<RecordOutcome>,
}

impl TickSummary {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.iter().filter(|o| o.outcome == outcome).count()
    }
}

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 86_400_000.0
}

fn precheck_input(record: &SchedulableRecord, now: DateTime<Utc>) -> PrecheckInput {
    PrecheckInput {
        action_count: record.action_count,
        days_since_last_action: record.last_action_at.map(|t| days_between(t, now)),
        days_since_last_update: days_between(record.updated_at, now),
        days_since_creation: days_between(record.created_at, now),
        priority: record.record.priority,
    }
}

/// Drives one workflow's records through one tick of the scheduler.
pub struct Scheduler<S: CheckpointSaver> {
    workflow_id: String,
    rules: SchedulerRules,
    runtime: Arc<Runtime<S>>,
    in_flight: Arc<Mutex<()>>,
}

impl<S: CheckpointSaver> Scheduler<S> {
    pub fn new(workflow_id: impl Into<String>, rules: SchedulerRules, runtime: Arc<Runtime<S>>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            rules,
            runtime,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    fn thread_id(&self, record_id: &str) -> String {
        format!("{}:{}", self.workflow_id, record_id)
    }

    /// Runs a single tick against `provider`, evaluated as of `now`.
    pub async fn tick(&self, provider: &dyn RecordProvider, now: DateTime<Utc>) -> Result<TickSummary> {
        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| SchedulerError::TickInFlight(self.workflow_id.clone()))?;

        let eligible = provider
            .list_eligible(&self.rules.enabled_statuses, self.rules.batch_size)
            .await?;

        tracing::info!(
            workflow_id = %self.workflow_id,
            candidates = eligible.len(),
            "scheduler tick starting"
        );

        let mut summary = TickSummary::default();
        for record in eligible {
            let record_id = record.record.id.clone();
            let decision = precheck(&self.rules, precheck_input(&record, now));

            if !decision.proceed {
                tracing::debug!(record_id = %record_id, reason = ?decision.reason, "static pre-check skipped record");
                summary.outcomes.push(RecordOutcome {
                    record_id,
                    outcome: Outcome::SkippedStatic,
                    reason: Some(decision.reason),
                    error: None,
                });
                continue;
            }

            let thread_id = self.thread_id(&record_id);
            let initial = ThreadState::new(record.record.clone(), record.contact.clone());
            let prior_attempts = record.action_count;

            match self.runtime.invoke(&thread_id, Some(initial)).await {
                Ok(RunOutcome::Finished(state)) | Ok(RunOutcome::Interrupted { state, .. }) => {
                    let outcome = if state.attempts > prior_attempts {
                        Outcome::ActionTaken
                    } else {
                        Outcome::SkippedAi
                    };
                    summary.outcomes.push(RecordOutcome {
                        record_id,
                        outcome,
                        reason: Some(decision.reason),
                        error: None,
                    });
                }
                Err(source) => {
                    let err = SchedulerError::GraphRun {
                        record_id: record_id.clone(),
                        source,
                    };
                    tracing::warn!(record_id = %record_id, error = %err, "graph run failed during tick");
                    summary.outcomes.push(RecordOutcome {
                        record_id,
                        outcome: Outcome::Error,
                        reason: None,
                        error: Some(err.to_string()),
                    });
                }
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record_provider::InMemoryRecordProvider;
    use async_trait::async_trait;
    use outreach_checkpoint::InMemoryCheckpointSaver;
    use outreach_graph::{
        legacy_topology, InvokeContext, InvokeLlm, Priority, Record, RecordStatus, ToolExecutor,
        ToolResult,
    };
    use serde_json::Value;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedLlm {
        responses: Vec<&'static str>,
        next: AtomicUsize,
    }

    #[async_trait]
    impl InvokeLlm for ScriptedLlm {
        async fn invoke(
            &self,
            _history: &[outreach_graph::Message],
            _user_message: &str,
            _ctx: &InvokeContext,
        ) -> outreach_graph::Result<String> {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses.get(i).copied().unwrap_or("complete").to_string())
        }
    }

    struct NoopTools;

    #[async_trait]
    impl ToolExecutor for NoopTools {
        async fn execute(&self, _name: &str, _args: Value) -> ToolResult {
            ToolResult::ok("ok", None)
        }
    }

    fn scheduler(responses: Vec<&'static str>) -> Scheduler<InMemoryCheckpointSaver> {
        let runtime = Runtime::new(
            legacy_topology().unwrap(),
            InMemoryCheckpointSaver::new(),
            Arc::new(ScriptedLlm {
                responses,
                next: AtomicUsize::new(0),
            }),
            Arc::new(NoopTools),
            InvokeContext::default(),
        );
        Scheduler::new("wf1", SchedulerRules::default(), Arc::new(runtime))
    }

    fn schedulable(id: &str, priority: Priority, created_days_ago: i64) -> SchedulableRecord {
        let now = Utc::now();
        SchedulableRecord {
            record: Record {
                id: id.to_string(),
                title: "Invoice".into(),
                status: RecordStatus::Open,
                priority: Some(priority),
                record_type: "invoice".into(),
                metadata: HashMap::new(),
            },
            contact: None,
            created_at: now - chrono::Duration::days(created_days_ago),
            updated_at: now - chrono::Duration::days(created_days_ago),
            action_count: 0,
            last_action_at: None,
        }
    }

    #[tokio::test]
    async fn proceeding_record_that_sends_email_is_action_taken() {
        let scheduler = scheduler(vec!["needs_email"]);
        let provider = InMemoryRecordProvider::new();
        provider.seed(schedulable("r1", Priority::High, 10)).await;

        let summary = scheduler.tick(&provider, Utc::now()).await.unwrap();
        assert_eq!(summary.count(Outcome::ActionTaken), 1);
    }

    #[tokio::test]
    async fn max_attempts_reached_is_skipped_static_without_entering_graph() {
        let scheduler = scheduler(vec!["needs_email"]);
        let provider = InMemoryRecordProvider::new();
        let mut record = schedulable("r2", Priority::Medium, 30);
        record.action_count = 5;
        provider.seed(record).await;

        let summary = scheduler.tick(&provider, Utc::now()).await.unwrap();
        assert_eq!(summary.count(Outcome::SkippedStatic), 1);
        assert_eq!(
            summary.outcomes[0].reason,
            Some(ReasonCode::MaxAttemptsReached)
        );
    }

    #[tokio::test]
    async fn analyze_complete_without_effect_is_skipped_ai() {
        let scheduler = scheduler(vec!["complete"]);
        let provider = InMemoryRecordProvider::new();
        provider.seed(schedulable("r3", Priority::Medium, 10)).await;

        let summary = scheduler.tick(&provider, Utc::now()).await.unwrap();
        assert_eq!(summary.count(Outcome::SkippedAi), 1);
    }
}
