//! End-to-end tests driving the compiled legacy topology through an
//! in-memory checkpointer with scripted LLM/tool stand-ins.

use async_trait::async_trait;
use outreach_checkpoint::InMemoryCheckpointSaver;
use outreach_graph::{
    legacy_topology, Channel, Contact, InvokeContext, InvokeLlm, Priority, Record, RecordStatus,
    Role, Runtime, RunOutcome, ToolExecutor, ToolResult, WorkflowStatus,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct ScriptedLlm {
    responses: Vec<&'static str>,
    next: AtomicUsize,
}

impl ScriptedLlm {
    fn new(responses: Vec<&'static str>) -> Self {
        Self {
            responses,
            next: AtomicUsize::new(0),
        }
    }
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
        Ok(self
            .responses
            .get(i)
            .copied()
            .unwrap_or("complete")
            .to_string())
    }
}

#[derive(Default)]
struct ScriptedTools {
    responses: HashMap<&'static str, ToolResult>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTools {
    fn new(responses: HashMap<&'static str, ToolResult>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ToolExecutor for ScriptedTools {
    async fn execute(&self, name: &str, args: Value) -> ToolResult {
        self.calls.lock().unwrap().push((name.to_string(), args));
        self.responses
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolResult::ok("ok", None))
    }
}

fn sample_state() -> outreach_graph::ThreadState {
    outreach_graph::ThreadState::new(
        Record {
            id: "rec1".into(),
            title: "Invoice 1001".into(),
            status: RecordStatus::Open,
            priority: Some(Priority::High),
            record_type: "invoice".into(),
            metadata: HashMap::new(),
        },
        Some(Contact {
            id: "c1".into(),
            display_name: "Jane Doe".into(),
            email: Some("jane@example.com".into()),
            phone: Some("+15551234".into()),
            preferred_channel: Some("EMAIL".into()),
        }),
    )
}

fn runtime(
    llm: ScriptedLlm,
    tools: ScriptedTools,
) -> (Runtime<InMemoryCheckpointSaver>, Arc<ScriptedTools>) {
    let tools = Arc::new(tools);
    let rt = Runtime::new(
        legacy_topology().unwrap(),
        InMemoryCheckpointSaver::new(),
        Arc::new(llm),
        tools.clone() as Arc<dyn ToolExecutor>,
        InvokeContext::default(),
    );
    (rt, tools)
}

#[tokio::test]
async fn s1_happy_path_email_flow() {
    let llm = ScriptedLlm::new(vec!["needs_email", "complete"]);
    let mut responses = HashMap::new();
    responses.insert(
        "sendEmail",
        ToolResult::ok("sent", Some(json!({"messageId": "m1"}))),
    );
    let (rt, tools) = runtime(llm, ScriptedTools::new(responses));

    let outcome = rt
        .stream("t1", Some(sample_state()), None)
        .await
        .unwrap();
    let (_, outcome) = outcome;
    let RunOutcome::Interrupted { state, node, .. } = outcome else {
        panic!("expected the thread to suspend at waitForResponse");
    };
    assert_eq!(node, "waitForResponse");
    assert_eq!(state.attempts, 1);
    assert_eq!(state.last_channel, Some(Channel::Email));

    let outcome = rt
        .resume(
            "t1",
            json!({"channel": "EMAIL", "content": "Thanks, paid."}),
        )
        .await
        .unwrap();

    let RunOutcome::Finished(state) = outcome else {
        panic!("expected the thread to finish");
    };
    assert_eq!(state.record.status, RecordStatus::Done);
    assert_eq!(state.workflow_status, WorkflowStatus::Completed);
    assert_eq!(state.attempts, 1);
    assert_eq!(state.last_channel, Some(Channel::Email));

    let calls = tools.calls.lock().unwrap();
    assert!(calls
        .iter()
        .any(|(name, args)| name == "updateRecordStatus" && args["status"] == "DONE"));
}

#[tokio::test]
async fn s2_no_response_human_review_waits() {
    // Three analyze/process-response rounds happen before humanReview is
    // reached: the initial decision, processResponse's own (non-routing)
    // call after resume, then the second analyzeRecord decision.
    let llm = ScriptedLlm::new(vec!["needs_call", "thanks, noted", "escalate"]);
    let mut responses = HashMap::new();
    responses.insert("sendCall", ToolResult::ok("dialed", None));
    let (rt, _tools) = runtime(llm, ScriptedTools::new(responses));

    let (_, outcome) = rt
        .stream("t2", Some(sample_state()), None)
        .await
        .unwrap();
    let RunOutcome::Interrupted { node, .. } = outcome else {
        panic!("expected suspension at waitForResponse");
    };
    assert_eq!(node, "waitForResponse");

    let (_, outcome) = rt
        .stream("t2", None, Some(json!({"timeout": true, "content": ""})))
        .await
        .unwrap();
    let RunOutcome::Interrupted { node, .. } = outcome else {
        panic!("expected suspension at humanReview");
    };
    assert_eq!(node, "humanReview");
}

#[tokio::test]
async fn s4_tool_failure_still_advances_and_is_visible_in_messages() {
    let llm = ScriptedLlm::new(vec!["needs_email"]);
    let mut responses = HashMap::new();
    responses.insert("sendEmail", ToolResult::err("SMTP down"));
    let (rt, _tools) = runtime(llm, ScriptedTools::new(responses));

    let (_, outcome) = rt
        .stream("t4", Some(sample_state()), None)
        .await
        .unwrap();
    let RunOutcome::Interrupted { state, .. } = outcome else {
        panic!("send-effect failure must not short-circuit routing");
    };
    assert_eq!(state.attempts, 1);
    assert!(state
        .messages
        .iter()
        .any(|m| m.role == Role::Tool && m.content.contains("SMTP down")));
}

#[tokio::test]
async fn resume_on_unknown_thread_fails_distinctly() {
    let llm = ScriptedLlm::new(vec!["needs_email"]);
    let (rt, _tools) = runtime(llm, ScriptedTools::new(HashMap::new()));

    let err = rt
        .resume("does-not-exist", json!({"content": ""}))
        .await
        .unwrap_err();
    assert!(matches!(err, outreach_graph::GraphError::ThreadNotFound(_)));
}

#[tokio::test]
async fn resume_on_finished_thread_has_no_pending_interrupt() {
    let llm = ScriptedLlm::new(vec!["escalate"]);
    let (rt, _tools) = runtime(llm, ScriptedTools::new(HashMap::new()));

    let (_, outcome) = rt
        .stream("t5", Some(sample_state()), None)
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Interrupted { .. }));

    let (_, outcome) = rt
        .resume("t5", json!({"approved": true, "notes": "ok", "nextAction": "close"}))
        .await
        .unwrap();
    assert!(matches!(outcome, RunOutcome::Finished(_)));

    let err = rt
        .resume("t5", json!({"approved": true, "notes": "again", "nextAction": "close"}))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        outreach_graph::GraphError::NoPendingInterrupt(_)
    ));
}

#[tokio::test]
async fn messages_are_append_only_across_checkpoints() {
    let llm = ScriptedLlm::new(vec!["needs_email", "complete"]);
    let mut responses = HashMap::new();
    responses.insert("sendEmail", ToolResult::ok("sent", None));
    let (rt, _tools) = runtime(llm, ScriptedTools::new(responses));

    let (snapshots, _) = rt
        .stream("t6", Some(sample_state()), None)
        .await
        .unwrap();

    for window in snapshots.windows(2) {
        let (prev, next) = (&window[0], &window[1]);
        assert!(next.messages.len() >= prev.messages.len());
        assert_eq!(&next.messages[..prev.messages.len()], &prev.messages[..]);
    }
}
