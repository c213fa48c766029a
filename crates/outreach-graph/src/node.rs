//! The five polymorphic node kinds.
//!
//! Every node is a pure-ish function `state -> outcome` (async because
//! analyze/process-response call the LLM and send-effect/terminal call
//! tools). Suspension is modeled as a return value rather than an exception:
//! [`NodeOutcome::Suspend`] replaces the sentinel-throwing interrupt
//! primitive a dynamically-typed source would use.

use crate::error::{GraphError, Result};
use crate::llm_trait::{InvokeContext, InvokeLlm};
use crate::messages::{rewrite_tool_messages_for_llm, Message, Role};
use crate::state::{Channel, PartialThreadState, RecordStatus, ThreadState, WorkflowStatus};
use crate::tool_trait::ToolExecutor;
use serde::Deserialize;
use serde_json::{json, Value};

/// What running a node produced.
pub enum NodeOutcome {
    /// A normal step: merge this partial state and continue.
    Progress(PartialThreadState),
    /// The node suspended, waiting for an external value. `payload` is
    /// surfaced to the caller as the interrupt marker; the runtime
    /// checkpoints and returns without advancing.
    Suspend(Value),
}

/// Which effect a send-effect node performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectChannel {
    Email,
    Call,
}

impl EffectChannel {
    fn tool_name(self) -> &'static str {
        match self {
            EffectChannel::Email => "sendEmail",
            EffectChannel::Call => "sendCall",
        }
    }

    fn channel(self) -> Channel {
        match self {
            EffectChannel::Email => Channel::Email,
            EffectChannel::Call => Channel::Phone,
        }
    }
}

/// Which wait-interrupt a node implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptKind {
    WaitForResponse,
    HumanReview,
}

/// Decision a human reviewer returns through `humanReview`'s resume value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextAction {
    Continue,
    Escalate,
    Close,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HumanReviewResume {
    #[allow(dead_code)]
    approved: bool,
    notes: String,
    next_action: NextAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WaitForResponseResume {
    channel: Option<Channel>,
    content: String,
    #[serde(default)]
    channel_message_id: Option<String>,
    #[serde(default)]
    timeout: Option<bool>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// The polymorphic node kind. The declarative `type ∈ {llm,tool,interrupt}`
/// from a workflow definition constructs one of these variants.
pub enum Node {
    Analyze,
    SendEffect(EffectChannel),
    WaitInterrupt(InterruptKind),
    ProcessResponse,
    Terminal,
}

impl Node {
    pub async fn run(
        &self,
        state: &ThreadState,
        resume_value: Option<Value>,
        llm: &dyn InvokeLlm,
        tools: &dyn ToolExecutor,
        ctx: &InvokeContext,
    ) -> Result<NodeOutcome> {
        match self {
            Node::Analyze => analyze(state, llm, ctx).await,
            Node::SendEffect(channel) => send_effect(*channel, state, tools).await,
            Node::WaitInterrupt(kind) => wait_interrupt(*kind, state, resume_value).await,
            Node::ProcessResponse => process_response(state, llm, ctx).await,
            Node::Terminal => terminal(state, tools).await,
        }
    }
}

fn summarize(state: &ThreadState) -> String {
    let contact_line = match &state.contact {
        Some(c) => format!("{} ({})", c.display_name, c.id),
        None => "no contact on file".to_string(),
    };
    let recent: Vec<&str> = state
        .messages
        .iter()
        .rev()
        .take(5)
        .map(|m| m.content.as_str())
        .collect();
    format!(
        "Record {} \"{}\" [{}] contact: {}. attempts: {}. last channel: {:?}. recent messages: {:?}",
        state.record.id,
        state.record.title,
        state.record.record_type,
        contact_line,
        state.attempts,
        state.last_channel,
        recent,
    )
}

fn classify_decision(response: &str) -> &'static str {
    let lower = response.to_lowercase();
    if lower.contains("needs_email") || lower.contains("send email") {
        "sendEmail"
    } else if lower.contains("needs_call") || lower.contains("send call") {
        "sendCall"
    } else if lower.contains("escalate") {
        "humanReview"
    } else {
        "markComplete"
    }
}

/// Runs one `InvokeLlm::invoke` call, retrying per `ctx.retry` only on the
/// transient `LLMUnavailable` branch (spec.md §7) — contract violations
/// (`ToolArgsInvalid`, `ToolLoopExceeded`) propagate on the first attempt.
async fn invoke_llm_with_retry(
    llm: &dyn InvokeLlm,
    history: &[Message],
    user_message: &str,
    ctx: &InvokeContext,
) -> Result<String> {
    let mut attempt = 1;
    loop {
        match llm.invoke(history, user_message, ctx).await {
            Ok(text) => return Ok(text),
            Err(GraphError::LLMUnavailable(msg)) => {
                if !ctx.retry.should_retry(attempt) {
                    return Err(GraphError::LLMUnavailable(msg));
                }
                tracing::warn!(attempt, "LLM unavailable, retrying: {msg}");
                tokio::time::sleep(ctx.retry.delay_for(attempt)).await;
                attempt += 1;
            }
            Err(other) => return Err(other),
        }
    }
}

async fn analyze(state: &ThreadState, llm: &dyn InvokeLlm, ctx: &InvokeContext) -> Result<NodeOutcome> {
    let history = rewrite_tool_messages_for_llm(&state.messages);
    let summary = summarize(state);
    let response = invoke_llm_with_retry(llm, &history, &summary, ctx).await?;
    let decision = classify_decision(&response);

    let assistant_message =
        Message::assistant(response).with_metadata(json!({ "decision": decision }));

    Ok(NodeOutcome::Progress(
        PartialThreadState::new()
            .with_current_node("analyzeRecord")
            .with_next_node(decision)
            .with_message(assistant_message),
    ))
}

async fn send_effect(
    channel: EffectChannel,
    state: &ThreadState,
    tools: &dyn ToolExecutor,
) -> Result<NodeOutcome> {
    let args = match channel {
        EffectChannel::Email => json!({
            "to": state.contact.as_ref().and_then(|c| c.email.clone()),
            "subject": format!("Re: {}", state.record.title),
            "body": format!("Regarding record {}", state.record.id),
        }),
        EffectChannel::Call => json!({
            "phone": state.contact.as_ref().and_then(|c| c.phone.clone()),
            "talkingPoints": [format!("Regarding record {}", state.record.id)],
        }),
    };

    let result = tools.execute(channel.tool_name(), args).await;
    let note = Message::tool(format!(
        "{}: {}",
        channel.tool_name(),
        result.message
    ));

    Ok(NodeOutcome::Progress(
        PartialThreadState::new()
            .with_current_node(channel.tool_name())
            .with_next_node("waitForResponse")
            .with_message(note)
            .also(|p| {
                p.attempts = Some(state.attempts + 1);
                p.last_channel = Some(channel.channel());
                p.waiting_for_response = Some(true);
            }),
    ))
}

async fn wait_interrupt(
    kind: InterruptKind,
    state: &ThreadState,
    resume_value: Option<Value>,
) -> Result<NodeOutcome> {
    let Some(resume_value) = resume_value else {
        let node_name = match kind {
            InterruptKind::WaitForResponse => "waitForResponse",
            InterruptKind::HumanReview => "humanReview",
        };
        return Ok(NodeOutcome::Suspend(json!({
            "node": node_name,
            "threadRecordId": state.record.id,
        })));
    };

    match kind {
        InterruptKind::WaitForResponse => {
            let resume: WaitForResponseResume = serde_json::from_value(resume_value)
                .map_err(|e| GraphError::ToolArgsInvalid {
                    tool: "waitForResponse".into(),
                    source: e,
                })?;
            let mut message = Message::user(resume.content);
            if let Some(channel) = resume.channel {
                message = message.with_channel(format!("{channel:?}").to_uppercase());
            }
            if let Some(id) = resume.channel_message_id {
                message.channel_message_id = Some(id);
            }
            if let Some(meta) = resume.metadata {
                message = message.with_metadata(meta);
            }
            let _ = resume.timeout;

            Ok(NodeOutcome::Progress(
                PartialThreadState::new()
                    .with_current_node("waitForResponse")
                    .with_next_node("processResponse")
                    .with_message(message)
                    .also(|p| p.waiting_for_response = Some(false)),
            ))
        }
        InterruptKind::HumanReview => {
            let resume: HumanReviewResume = serde_json::from_value(resume_value)
                .map_err(|e| GraphError::ToolArgsInvalid {
                    tool: "humanReview".into(),
                    source: e,
                })?;
            let status = if resume.next_action == NextAction::Close {
                WorkflowStatus::Completed
            } else {
                WorkflowStatus::Running
            };

            Ok(NodeOutcome::Progress(
                PartialThreadState::new()
                    .with_current_node("humanReview")
                    .with_next_node("analyzeRecord")
                    .with_message(Message::user(resume.notes))
                    .also(|p| p.workflow_status = Some(status)),
            ))
        }
    }
}

async fn process_response(
    state: &ThreadState,
    llm: &dyn InvokeLlm,
    ctx: &InvokeContext,
) -> Result<NodeOutcome> {
    let history = rewrite_tool_messages_for_llm(&state.messages);
    let latest_inbound = state
        .messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.clone())
        .unwrap_or_default();

    let response = invoke_llm_with_retry(llm, &history, &latest_inbound, ctx).await?;

    Ok(NodeOutcome::Progress(
        PartialThreadState::new()
            .with_current_node("processResponse")
            .with_next_node("analyzeRecord")
            .with_message(Message::assistant(response)),
    ))
}

async fn terminal(state: &ThreadState, tools: &dyn ToolExecutor) -> Result<NodeOutcome> {
    let result = tools
        .execute("updateRecordStatus", json!({ "status": "DONE" }))
        .await;

    let mut record = state.record.clone();
    record.status = RecordStatus::Done;

    Ok(NodeOutcome::Progress(
        PartialThreadState::new()
            .with_current_node("markComplete")
            .with_next_node(crate::state::END)
            .with_message(Message::tool(result.message))
            .also(|p| {
                p.workflow_status = Some(WorkflowStatus::Completed);
                p.record = Some(record);
            }),
    ))
}
