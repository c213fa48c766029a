//! Environment-variable configuration (spec.md §6), collected the way the
//! teacher's `tooling::config::env` module loads and parses `std::env` vars
//! one key at a time rather than through a config-file framework.

use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} contains invalid UTF-8")]
    InvalidUnicode(String),
    #[error("environment variable {key} could not be parsed: {source}")]
    Parse {
        key: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

type Result<T> = std::result::Result<T, ConfigError>;

fn get_env(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) => Ok(Some(val)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidUnicode(key.to_string())),
    }
}

fn get_env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get_env(key)? {
        Some(val) => val
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::Parse {
                key: key.to_string(),
                source: Box::new(e),
            }),
        None => Ok(None),
    }
}

fn get_env_bool(key: &str, default: bool) -> bool {
    match get_env(key) {
        Ok(Some(val)) => matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on"),
        _ => default,
    }
}

/// The engine's ambient configuration surface (spec.md §6's "Configuration
/// options (enumerated)" table).
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Required for the remote LLM layer; absent when only the keyword
    /// stub is used (`eval`/`tick --dry-run`-style invocations).
    pub openai_api_key: Option<String>,
    /// Reserved for a durable checkpoint backend; unused by the in-memory
    /// store this CLI runs against today.
    pub database_url: Option<String>,
    /// If set, resume endpoints (not yet exposed by this CLI) would require
    /// a matching header; recorded here so a future HTTP surface can read
    /// it from the same config struct.
    pub webhook_secret: Option<String>,
    /// Bypasses authentication on the API surface when true.
    pub dev_mode: bool,
    /// Caps the tool-call iteration loop inside a single LLM invocation.
    pub max_tool_iterations: u32,
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: get_env("OPENAI_API_KEY")?,
            database_url: get_env("DATABASE_URL")?,
            webhook_secret: get_env("WEBHOOK_SECRET")?,
            dev_mode: get_env_bool("DEV_MODE", false),
            max_tool_iterations: get_env_parse("MAX_TOOL_ITERATIONS")?.unwrap_or(15),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_vars_fall_back_to_none_or_default() {
        env::remove_var("OUTREACH_CLI_TEST_MISSING_VAR");
        assert!(get_env("OUTREACH_CLI_TEST_MISSING_VAR").unwrap().is_none());
        assert!(!get_env_bool("OUTREACH_CLI_TEST_MISSING_VAR", false));
    }

    #[test]
    fn bool_parsing_recognizes_common_truthy_spellings() {
        env::set_var("OUTREACH_CLI_TEST_BOOL", "Yes");
        assert!(get_env_bool("OUTREACH_CLI_TEST_BOOL", false));
        env::remove_var("OUTREACH_CLI_TEST_BOOL");
    }

    #[test]
    fn parse_failure_on_malformed_numeric_value() {
        env::set_var("OUTREACH_CLI_TEST_NUM", "not-a-number");
        let result: Result<Option<u32>> = get_env_parse("OUTREACH_CLI_TEST_NUM");
        assert!(result.is_err());
        env::remove_var("OUTREACH_CLI_TEST_NUM");
    }
}
