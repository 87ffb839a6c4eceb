use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL_NAME: &str = "gemini-pro";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub chat: ChatSettings,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// Absent means the model collaborator stays uninitialized.
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    /// Upper bound on a single model call.
    pub model_timeout_secs: u64,
    /// Most recent turns sent to the model; 0 sends the whole history.
    pub max_history_turns: usize,
}

impl ChatSettings {
    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs)
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model_timeout_secs: DEFAULT_MODEL_TIMEOUT_SECS,
            max_history_turns: 0,
        }
    }
}

impl ChatConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Secret::new);

        Ok(ChatConfig {
            common: common_config,
            google: GoogleConfig {
                api_key,
                model: get_env("MODEL_NAME", Some(DEFAULT_MODEL_NAME))?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_GEMINI_API_BASE))?,
            },
            chat: ChatSettings {
                model_timeout_secs: parse_timeout_secs(&get_env(
                    "CHAT_MODEL_TIMEOUT_SECS",
                    Some(&DEFAULT_MODEL_TIMEOUT_SECS.to_string()),
                )?),
                max_history_turns: get_env("CHAT_MAX_HISTORY_TURNS", Some("0"))?
                    .parse()
                    .unwrap_or(0),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

/// Zero or unparsable values fall back to the default.
fn parse_timeout_secs(raw: &str) -> u64 {
    raw.trim()
        .parse()
        .ok()
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_MODEL_TIMEOUT_SECS)
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}
