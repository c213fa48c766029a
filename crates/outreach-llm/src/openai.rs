//! OpenAI-chat-completions-shaped `InvokeLlm` implementation.
//!
//! Runs the tool-call iteration spec'd for the analyze/process-response
//! nodes: send a chat completion, and if the model asks for tool calls,
//! execute each through the injected [`ToolExecutor`] and feed the results
//! back as tool-role messages, repeating until the model returns plain text
//! or the iteration cap is hit.

use crate::config::RemoteLlmConfig;
use crate::error::{LlmError, Result};
use async_trait::async_trait;
use outreach_graph::{InvokeContext, InvokeLlm, Message, Role, ToolExecutor};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub struct OpenAiInvoker {
    config: RemoteLlmConfig,
    http: reqwest::Client,
    tools: Arc<dyn ToolExecutor>,
}

impl OpenAiInvoker {
    pub fn new(config: RemoteLlmConfig, tools: Arc<dyn ToolExecutor>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to construct HTTP client");
        Self {
            config,
            http,
            tools,
        }
    }

    fn to_wire(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

#[async_trait]
impl InvokeLlm for OpenAiInvoker {
    async fn invoke(
        &self,
        history: &[Message],
        user_message: &str,
        ctx: &InvokeContext,
    ) -> outreach_graph::Result<String> {
        let system_prompt = ctx
            .system_prompt
            .clone()
            .unwrap_or_else(|| "You are an outreach assistant.".to_string());

        let mut conversation: Vec<WireMessage> = Vec::with_capacity(history.len() + 2);
        conversation.push(WireMessage {
            role: "system".to_string(),
            content: Some(system_prompt),
            tool_calls: None,
            tool_call_id: None,
        });
        for m in history {
            conversation.push(WireMessage {
                role: Self::to_wire(m.role).to_string(),
                content: Some(m.content.clone()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        conversation.push(WireMessage {
            role: "user".to_string(),
            content: Some(user_message.to_string()),
            tool_calls: None,
            tool_call_id: None,
        });

        let tool_catalogue: Vec<WireTool> = ctx
            .allowed_tools
            .iter()
            .map(|name| WireTool::stub(name))
            .collect();

        for _ in 0..self.config.max_tool_iterations {
            let request = WireRequest {
                model: ctx.model.clone(),
                temperature: ctx.temperature,
                messages: conversation.clone(),
                tools: if tool_catalogue.is_empty() {
                    None
                } else {
                    Some(tool_catalogue.clone())
                },
            };

            let response: WireResponse = self
                .http
                .post(format!("{}/chat/completions", self.config.base_url))
                .bearer_auth(&self.config.api_key)
                .json(&request)
                .send()
                .await
                .map_err(LlmError::Http)?
                .json()
                .await
                .map_err(LlmError::Http)?;

            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| LlmError::InvalidResponse("no choices in response".to_string()))?;

            let message = choice.message;

            let Some(tool_calls) = message.tool_calls.filter(|calls| !calls.is_empty()) else {
                return Ok(message.content.unwrap_or_default());
            };

            conversation.push(WireMessage {
                role: "assistant".to_string(),
                content: message.content,
                tool_calls: Some(tool_calls.clone()),
                tool_call_id: None,
            });

            for call in tool_calls {
                let args: Value = serde_json::from_str(&call.function.arguments).map_err(|e| {
                    LlmError::ToolArgsInvalid {
                        tool: call.function.name.clone(),
                        source: e,
                    }
                })?;
                let result = self.tools.execute(&call.function.name, args).await;
                conversation.push(WireMessage {
                    role: "tool".to_string(),
                    content: Some(serde_json::to_string(&result).unwrap_or_default()),
                    tool_calls: None,
                    tool_call_id: Some(call.id),
                });
            }
        }

        Err(LlmError::ToolLoopExceeded {
            cap: self.config.max_tool_iterations,
        }
        .into())
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireRequest {
    model: String,
    temperature: f32,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<WireTool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Clone, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunctionDef,
}

impl WireTool {
    fn stub(name: &str) -> Self {
        Self {
            kind: "function",
            function: WireFunctionDef {
                name: name.to_string(),
                description: format!("Invoke the {name} tool."),
                parameters: serde_json::json!({ "type": "object" }),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct WireFunctionDef {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}
