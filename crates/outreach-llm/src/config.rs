//! Configuration for the OpenAI-style remote client.

use crate::error::{LlmError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RemoteLlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tool_iterations: u32,
}

impl RemoteLlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(30),
            max_tool_iterations: 15,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Reads `OPENAI_API_KEY` from the environment, per §6's enumerated
    /// configuration options.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::ApiKeyMissing("OPENAI_API_KEY".to_string()))?;
        Ok(Self::new(api_key))
    }
}
