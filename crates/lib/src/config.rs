//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.lingo/config.json`) and environment.
//! Credentials are normally supplied through the environment (`LINE_CHANNEL_SECRET`,
//! `LINE_CHANNEL_ACCESS_TOKEN`, `GROQ_API_KEY`); env values win over the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_CHANNEL_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_COMPLETION_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_PORT: &str = "PORT";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Messaging channel settings (LINE).
    #[serde(default)]
    pub channels: ChannelsConfig,

    /// Completion API settings.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Input validation limits.
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook server (default 5000). Overridden by PORT env.
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the platform must be able to reach the webhook).
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    5000
}

fn default_gateway_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Per-channel config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsConfig {
    #[serde(default)]
    pub line: LineChannelConfig,
}

/// LINE Messaging API channel config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineChannelConfig {
    /// Long-lived channel access token. Overridden by LINE_CHANNEL_ACCESS_TOKEN env.
    pub channel_access_token: Option<String>,
    /// Channel secret used to verify X-Line-Signature. Overridden by LINE_CHANNEL_SECRET env.
    pub channel_secret: Option<String>,
    /// API root (default https://api.line.me). Useful for pointing at a local stub.
    pub api_base: Option<String>,
    #[serde(default = "default_line_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_line_timeout_secs() -> u64 {
    10
}

impl Default for LineChannelConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: None,
            timeout_secs: default_line_timeout_secs(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint (Groq by default).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// Bearer API key. Overridden by GROQ_API_KEY env.
    pub api_key: Option<String>,
    /// Base URL up to and including the version segment (default https://api.groq.com/openai/v1).
    pub base_url: Option<String>,
    /// Model id passed as-is to the provider.
    #[serde(default = "default_model")]
    pub model: String,
    /// Sent only when set; otherwise the provider default applies.
    pub max_tokens: Option<u32>,
    /// Sent only when set; otherwise the provider default applies.
    pub temperature: Option<f32>,
    #[serde(default = "default_completion_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "mixtral-8x7b-32768".to_string()
}

fn default_completion_timeout_secs() -> u64 {
    30
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: default_model(),
            max_tokens: None,
            temperature: None,
            timeout_secs: default_completion_timeout_secs(),
        }
    }
}

/// Limits applied to user input before anything is sent to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationConfig {
    /// Maximum input length in characters (default 2000).
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Terms that cause the input to be refused (case-insensitive substring match). Empty disables the rule.
    #[serde(default)]
    pub sensitive_terms: Vec<String>,
}

fn default_max_input_chars() -> usize {
    2000
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            max_input_chars: default_max_input_chars(),
            sensitive_terms: Vec::new(),
        }
    }
}

/// Credentials needed to serve webhooks, resolved from env and config.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub channel_secret: String,
    pub channel_access_token: String,
    pub completion_api_key: String,
}

/// Non-blank env var value, trimmed.
fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the LINE channel secret: env LINE_CHANNEL_SECRET overrides config.
pub fn resolve_channel_secret(config: &Config) -> Option<String> {
    env_value(ENV_CHANNEL_SECRET).or_else(|| non_blank(config.channels.line.channel_secret.as_ref()))
}

/// Resolve the LINE channel access token: env LINE_CHANNEL_ACCESS_TOKEN overrides config.
pub fn resolve_channel_access_token(config: &Config) -> Option<String> {
    env_value(ENV_CHANNEL_ACCESS_TOKEN)
        .or_else(|| non_blank(config.channels.line.channel_access_token.as_ref()))
}

/// Resolve the completion API key: env GROQ_API_KEY overrides config.
pub fn resolve_completion_api_key(config: &Config) -> Option<String> {
    env_value(ENV_COMPLETION_API_KEY).or_else(|| non_blank(config.completion.api_key.as_ref()))
}

/// Resolve the listen port: env PORT overrides config. An unparseable PORT is an error.
pub fn resolve_port(config: &Config) -> Result<u16> {
    match env_value(ENV_PORT) {
        Some(p) => p
            .parse()
            .with_context(|| format!("{} is not a valid port: {}", ENV_PORT, p)),
        None => Ok(config.gateway.port),
    }
}

/// Resolve all three credentials or fail naming the first missing one.
pub fn resolve_credentials(config: &Config) -> Result<Credentials> {
    let channel_secret = resolve_channel_secret(config).with_context(|| {
        format!(
            "LINE channel secret not configured (set {} or channels.line.channelSecret)",
            ENV_CHANNEL_SECRET
        )
    })?;
    let channel_access_token = resolve_channel_access_token(config).with_context(|| {
        format!(
            "LINE channel access token not configured (set {} or channels.line.channelAccessToken)",
            ENV_CHANNEL_ACCESS_TOKEN
        )
    })?;
    let completion_api_key = resolve_completion_api_key(config).with_context(|| {
        format!(
            "completion API key not configured (set {} or completion.apiKey)",
            ENV_COMPLETION_API_KEY
        )
    })?;
    Ok(Credentials {
        channel_secret,
        channel_access_token,
        completion_api_key,
    })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("LINGO_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".lingo").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or LINGO_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Write the default config to `path` if no file exists there. Returns true when a file was written.
pub fn init_config(path: &std::path::Path) -> Result<bool> {
    if path.exists() {
        log::debug!("config already exists at {}, skipping", path.display());
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
    }
    let json = serde_json::to_string_pretty(&Config::default()).context("serializing default config")?;
    std::fs::write(path, json)
        .with_context(|| format!("writing default config to {}", path.display()))?;
    log::info!("created default config at {}", path.display());
    Ok(true)
}
