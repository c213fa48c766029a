//! Tool dispatch (component F).
//!
//! [`ToolRegistry`] is the production [`ToolExecutor`] implementation:
//! handlers are registered by name, unknown names are reported rather than
//! panicking, and a handler's failure is converted to a structured
//! `{success: false, message}` result rather than propagated — exactly the
//! contract spec.md §4.6/§7 requires so the LLM layer always sees a value it
//! can feed back into the conversation.

use crate::clients::{CallGateway, EmailGateway, RecordStore};
use async_trait::async_trait;
use outreach_graph::{RecordStatus, ToolExecutor, ToolResult};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// One named effect handler. Implementations must never panic or return a
/// Rust `Err` across this trait — every failure is encoded in the returned
/// [`ToolResult`], matching [`ToolExecutor::execute`]'s contract.
#[async_trait]
trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> ToolResult;
}

fn args_error(tool: &str, source: serde_json::Error) -> ToolResult {
    ToolResult::err(format!("Tool error: invalid arguments for {tool}: {source}"))
}

#[derive(Deserialize)]
struct SendEmailArgs {
    to: Option<String>,
    subject: String,
    body: String,
}

struct SendEmailHandler(Arc<dyn EmailGateway>);

#[async_trait]
impl ToolHandler for SendEmailHandler {
    async fn call(&self, args: Value) -> ToolResult {
        let args: SendEmailArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return args_error("sendEmail", e),
        };
        match self
            .0
            .send_email(args.to.as_deref(), &args.subject, &args.body)
            .await
        {
            Ok(receipt) => ToolResult::ok(
                format!("email sent ({})", receipt.message_id),
                Some(serde_json::json!({ "messageId": receipt.message_id })),
            ),
            Err(e) => ToolResult::err(format!("Tool error: {e}")),
        }
    }
}

#[derive(Deserialize)]
struct SendCallArgs {
    phone: Option<String>,
    #[serde(rename = "talkingPoints", default)]
    talking_points: Vec<String>,
}

struct SendCallHandler(Arc<dyn CallGateway>);

#[async_trait]
impl ToolHandler for SendCallHandler {
    async fn call(&self, args: Value) -> ToolResult {
        let args: SendCallArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return args_error("sendCall", e),
        };
        match self
            .0
            .initiate_call(args.phone.as_deref(), &args.talking_points)
            .await
        {
            Ok(receipt) => ToolResult::ok(
                format!("call initiated ({})", receipt.call_id),
                Some(serde_json::json!({ "callId": receipt.call_id })),
            ),
            Err(e) => ToolResult::err(format!("Tool error: {e}")),
        }
    }
}

#[derive(Deserialize)]
struct RecordIdArgs {
    id: String,
}

struct GetRecordHandler(Arc<dyn RecordStore>);

#[async_trait]
impl ToolHandler for GetRecordHandler {
    async fn call(&self, args: Value) -> ToolResult {
        let args: RecordIdArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return args_error("getRecord", e),
        };
        match self.0.get_record(&args.id).await {
            Ok(Some(record)) => match serde_json::to_value(&record) {
                Ok(data) => ToolResult::ok("record found", Some(data)),
                Err(e) => ToolResult::err(format!("Tool error: {e}")),
            },
            Ok(None) => ToolResult::ok("record not found", None),
            Err(e) => ToolResult::err(format!("Tool error: {e}")),
        }
    }
}

struct GetRecordHistoryHandler(Arc<dyn RecordStore>);

#[async_trait]
impl ToolHandler for GetRecordHistoryHandler {
    async fn call(&self, args: Value) -> ToolResult {
        let args: RecordIdArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return args_error("getRecordHistory", e),
        };
        match self.0.get_record_history(&args.id).await {
            Ok(history) => match serde_json::to_value(&history) {
                Ok(data) => ToolResult::ok(format!("{} messages", history.len()), Some(data)),
                Err(e) => ToolResult::err(format!("Tool error: {e}")),
            },
            Err(e) => ToolResult::err(format!("Tool error: {e}")),
        }
    }
}

#[derive(Deserialize)]
struct UpdateRecordStatusArgs {
    #[serde(default)]
    id: Option<String>,
    status: RecordStatus,
}

struct UpdateRecordStatusHandler {
    store: Arc<dyn RecordStore>,
    default_record_id: Option<String>,
}

#[async_trait]
impl ToolHandler for UpdateRecordStatusHandler {
    async fn call(&self, args: Value) -> ToolResult {
        let args: UpdateRecordStatusArgs = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return args_error("updateRecordStatus", e),
        };
        let Some(id) = args.id.or_else(|| self.default_record_id.clone()) else {
            return ToolResult::err("Tool error: updateRecordStatus requires a record id");
        };
        match self.store.update_record_status(&id, args.status).await {
            Ok(()) => ToolResult::ok(format!("status updated to {:?}", args.status), None),
            Err(e) => ToolResult::err(format!("Tool error: {e}")),
        }
    }
}

/// Registry of named tool handlers; the production [`ToolExecutor`].
///
/// Unknown tool names and handler failures are both reported as
/// `{success: false, message}` rather than surfaced as Rust errors, so every
/// caller — the analyze node's LLM loop included — always gets a structured
/// value back.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the spec.md §4.6 required handler set
    /// (`sendEmail`, `sendCall`, `getRecord`, `getRecordHistory`,
    /// `updateRecordStatus`) against the given gateway/store
    /// implementations.
    pub fn with_default_handlers(
        email: Arc<dyn EmailGateway>,
        call: Arc<dyn CallGateway>,
        records: Arc<dyn RecordStore>,
    ) -> Self {
        let mut registry = Self::new();
        registry.register("sendEmail", Box::new(SendEmailHandler(email)));
        registry.register("sendCall", Box::new(SendCallHandler(call)));
        registry.register("getRecord", Box::new(GetRecordHandler(records.clone())));
        registry.register(
            "getRecordHistory",
            Box::new(GetRecordHistoryHandler(records.clone())),
        );
        registry.register(
            "updateRecordStatus",
            Box::new(UpdateRecordStatusHandler {
                store: records,
                default_record_id: None,
            }),
        );
        registry
    }

    fn register(&mut self, name: impl Into<String>, handler: Box<dyn ToolHandler>) {
        self.handlers.insert(name.into(), handler);
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, name: &str, args: Value) -> ToolResult {
        let Some(handler) = self.handlers.get(name) else {
            tracing::warn!(tool = name, "dispatch to unregistered tool");
            return ToolResult::err(format!("Unknown tool: {name}"));
        };
        tracing::debug!(tool = name, "dispatching tool call");
        handler.call(args).await
    }
}
