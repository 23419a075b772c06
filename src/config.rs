// src/config.rs
//! Runtime configuration: scoring weights, file paths, and both assistant
//! backends. Loaded once at process start and passed into each component —
//! no ambient globals.
//!
//! Source is a JSON file (default `config/stylist.json`, overridable via
//! `STYLIST_CONFIG_PATH`). A missing file yields the built-in defaults; a
//! malformed file or invalid values fail startup.

use serde::{Deserialize, Serialize};
use std::{env, fs, io};

use tracing::warn;

use crate::error::StylistError;

pub const DEFAULT_CONFIG_PATH: &str = "config/stylist.json";
pub const ENV_CONFIG_PATH: &str = "STYLIST_CONFIG_PATH";
/// Resolved into `remote.api_key` when the config file says `"ENV"`.
pub const ENV_API_KEY: &str = "STYLIST_API_KEY";

fn default_membership_weight() -> f64 {
    0.6
}
fn default_similarity_weight() -> f64 {
    0.4
}
fn default_color_bias_weight() -> f64 {
    0.05
}

/// Blend weights used by the score combiner. All must be non-negative; with
/// the defaults the combined score stays inside [0, 1] before the ceiling
/// clamp even kicks in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "default_membership_weight")]
    pub membership: f64,
    #[serde(default = "default_similarity_weight")]
    pub similarity: f64,
    #[serde(default = "default_color_bias_weight")]
    pub color_bias: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            membership: default_membership_weight(),
            similarity: default_similarity_weight(),
            color_bias: default_color_bias_weight(),
        }
    }
}

impl ScoreWeights {
    pub fn validate(&self) -> Result<(), StylistError> {
        for (name, w) in [
            ("membership", self.membership),
            ("similarity", self.similarity),
            ("color_bias", self.color_bias),
        ] {
            if !w.is_finite() || w < 0.0 {
                return Err(StylistError::Config(format!(
                    "score weight `{name}` must be a non-negative number, got {w}"
                )));
            }
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://integrate.api.nvidia.com/v1".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_remote_model() -> String {
    "meta/llama-3.1-8b-instruct".to_string()
}
fn default_temperature() -> f64 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_remote_timeout() -> u64 {
    30
}

/// Remote chat-completion endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteAssistantConfig {
    /// Base URL without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// "ENV" means: read from the STYLIST_API_KEY env var.
    #[serde(default = "default_api_key")]
    pub api_key: String,
    #[serde(default = "default_remote_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_remote_timeout")]
    pub timeout_secs: u64,
}

impl Default for RemoteAssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: default_api_key(),
            model: default_remote_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_remote_timeout(),
        }
    }
}

fn default_local_command() -> String {
    "ollama".to_string()
}
fn default_local_model() -> String {
    "mistral".to_string()
}
fn default_local_timeout() -> u64 {
    30
}

/// Local model-runner settings. Invoked as `<command> run <model> <prompt>`
/// with stdout captured as the reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalAssistantConfig {
    #[serde(default = "default_local_command")]
    pub command: String,
    #[serde(default = "default_local_model")]
    pub model: String,
    #[serde(default = "default_local_timeout")]
    pub timeout_secs: u64,
}

impl Default for LocalAssistantConfig {
    fn default() -> Self {
        Self {
            command: default_local_command(),
            model: default_local_model(),
            timeout_secs: default_local_timeout(),
        }
    }
}

fn default_catalog_path() -> String {
    "fashion_db.json".to_string()
}
fn default_preferences_path() -> String {
    "memory.json".to_string()
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    5001
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylistConfig {
    #[serde(default)]
    pub weights: ScoreWeights,
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,
    #[serde(default = "default_preferences_path")]
    pub preferences_path: String,
    /// Optional override for the built-in breakpoint tables.
    #[serde(default)]
    pub breakpoints_path: Option<String>,
    #[serde(default)]
    pub remote: RemoteAssistantConfig,
    #[serde(default)]
    pub local: LocalAssistantConfig,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for StylistConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            catalog_path: default_catalog_path(),
            preferences_path: default_preferences_path(),
            breakpoints_path: None,
            remote: RemoteAssistantConfig::default(),
            local: LocalAssistantConfig::default(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl StylistConfig {
    /// Load from `STYLIST_CONFIG_PATH` or the default path.
    pub fn load() -> Result<Self, StylistError> {
        let path = env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(&path)
    }

    /// Load from an explicit path. A missing file is fine (defaults apply);
    /// anything else wrong with it is not.
    pub fn load_from_path(path: &str) -> Result<Self, StylistError> {
        let cfg = match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str::<Self>(&data).map_err(|e| {
                StylistError::Config(format!("config {path} parse error: {e}"))
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                return Err(StylistError::Config(format!(
                    "failed to read config {path}: {e}"
                )))
            }
        };
        cfg.resolve()
    }

    /// Resolve the API key sentinel and validate values.
    fn resolve(mut self) -> Result<Self, StylistError> {
        if self.remote.api_key.trim().eq_ignore_ascii_case("env") {
            self.remote.api_key = env::var(ENV_API_KEY).unwrap_or_default();
            if self.remote.api_key.is_empty() {
                warn!("no {ENV_API_KEY} set; remote assistant calls will fall through to the local backend");
            }
        }

        self.weights.validate()?;

        if self.remote.timeout_secs == 0 || self.local.timeout_secs == 0 {
            return Err(StylistError::Config(
                "assistant timeouts must be at least one second".to_string(),
            ));
        }

        Ok(self)
    }
}
