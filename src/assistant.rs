//! Assistant backends: remote chat-completion HTTP call with a local
//! model-runner fallback and a static last-resort reply.
//!
//! The chain never surfaces an error to the caller — every request ends in
//! some reply text, tagged with the path that produced it.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{LocalAssistantConfig, RemoteAssistantConfig};
use crate::context::Context;
use crate::preferences::Preferences;
use crate::score::ScoreMap;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// Which path produced the reply text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssistantSource {
    Remote,
    Local,
    Static,
    Failed,
}

impl AssistantSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantSource::Remote => "remote",
            AssistantSource::Local => "local",
            AssistantSource::Static => "static",
            AssistantSource::Failed => "failed",
        }
    }
}

/// Reply returned by the fallback chain. `text` is raw backend output passed
/// through verbatim; JSON validity is left to the assistant and downstream
/// consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantReply {
    pub text: String,
    pub source: AssistantSource,
}

/// Outcome of a single backend attempt. Timeouts are kept apart from other
/// failures because the chain reacts differently to the two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendOutcome {
    Reply(String),
    TimedOut,
    Unavailable,
}

/// One prompt-to-text capability. Implemented by the remote HTTP backend,
/// the local process backend, and test stubs.
pub trait AssistantBackend: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = BackendOutcome> + Send + 'a>>;
    /// Backend name for diagnostics/headers.
    fn name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynBackend = Arc<dyn AssistantBackend>;

/// Fixed reply used when the local fallback times out.
pub const STATIC_FALLBACK_REPLY: &str = r#"{"outfit": "Navy Blazer + White Shirt", "reason": "Classic formal combination suitable for your preferences"}"#;

/// Reply used when both backends are unavailable.
pub const UNAVAILABLE_REPLY: &str =
    r#"{"outfit": "Error", "reason": "Both remote API and local model unavailable"}"#;

// ------------------------------------------------------------
// Prompt
// ------------------------------------------------------------

/// Build the stylist prompt sent to whichever backend answers.
pub fn build_prompt(context: &Context, combined: &ScoreMap, preferences: &Preferences) -> String {
    let context_json = serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
    let scores_json = serde_json::to_string_pretty(combined).unwrap_or_else(|_| "{}".to_string());
    let prefs_json =
        serde_json::to_string_pretty(preferences).unwrap_or_else(|_| "{}".to_string());

    format!(
        "You are a sustainable fashion AI stylist.\n\
         User context: {context_json}\n\
         Suitability scores: {scores_json}\n\
         User preferences: {prefs_json}\n\
         Recommend the best outfit and explain briefly in JSON:\n\
         {{\"outfit\": \"...\", \"reason\": \"...\"}}."
    )
}

// ------------------------------------------------------------
// Fallback chain
// ------------------------------------------------------------

/// Remote-first chain with the local process as fallback.
pub struct AssistantChain {
    remote: DynBackend,
    local: DynBackend,
}

impl AssistantChain {
    pub fn new(remote: DynBackend, local: DynBackend) -> Self {
        Self { remote, local }
    }

    pub fn from_config(remote: &RemoteAssistantConfig, local: &LocalAssistantConfig) -> Self {
        Self::new(
            Arc::new(RemoteBackend::new(remote)),
            Arc::new(LocalBackend::new(local)),
        )
    }

    /// Run the fallback ladder for a prepared prompt: remote reply wins;
    /// otherwise local reply; a local timeout yields the static
    /// recommendation; anything else the structured error reply.
    pub async fn request(&self, prompt: &str) -> AssistantReply {
        match self.remote.complete(prompt).await {
            BackendOutcome::Reply(text) => {
                return AssistantReply {
                    text,
                    source: AssistantSource::Remote,
                }
            }
            BackendOutcome::TimedOut => {
                warn!(backend = self.remote.name(), "remote assistant timed out; trying local fallback")
            }
            BackendOutcome::Unavailable => {
                warn!(backend = self.remote.name(), "remote assistant unavailable; trying local fallback")
            }
        }

        match self.local.complete(prompt).await {
            BackendOutcome::Reply(text) => AssistantReply {
                text,
                source: AssistantSource::Local,
            },
            BackendOutcome::TimedOut => {
                warn!(
                    backend = self.local.name(),
                    "local assistant timed out; returning static recommendation"
                );
                AssistantReply {
                    text: STATIC_FALLBACK_REPLY.to_string(),
                    source: AssistantSource::Static,
                }
            }
            BackendOutcome::Unavailable => {
                warn!(backend = self.local.name(), "local assistant unavailable");
                AssistantReply {
                    text: UNAVAILABLE_REPLY.to_string(),
                    source: AssistantSource::Failed,
                }
            }
        }
    }
}

// ------------------------------------------------------------
// Remote backend (chat-completion HTTP API)
// ------------------------------------------------------------

pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    max_tokens: u32,
}

impl RemoteBackend {
    pub fn new(cfg: &RemoteAssistantConfig) -> Self {
        let http = reqwest::Client::builder()
            .user_agent("fashion-stylist/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .expect("reqwest client");
        Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

impl AssistantBackend for RemoteBackend {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = BackendOutcome> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return BackendOutcome::Unavailable;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f64,
                max_tokens: u32,
                stream: bool,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let req = Req {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: prompt,
                }],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                stream: false,
            };

            let resp = match self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) if e.is_timeout() => return BackendOutcome::TimedOut,
                Err(_) => return BackendOutcome::Unavailable,
            };

            if resp.status() != reqwest::StatusCode::OK {
                return BackendOutcome::Unavailable;
            }

            let body: Resp = match resp.json().await {
                Ok(b) => b,
                Err(_) => return BackendOutcome::Unavailable,
            };
            match body.choices.first() {
                Some(c) if !c.message.content.trim().is_empty() => {
                    BackendOutcome::Reply(c.message.content.trim().to_string())
                }
                _ => BackendOutcome::Unavailable,
            }
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

// ------------------------------------------------------------
// Local backend (model-runner subprocess)
// ------------------------------------------------------------

pub struct LocalBackend {
    command: String,
    model: String,
    timeout: Duration,
}

impl LocalBackend {
    pub fn new(cfg: &LocalAssistantConfig) -> Self {
        Self {
            command: cfg.command.clone(),
            model: cfg.model.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

impl AssistantBackend for LocalBackend {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = BackendOutcome> + Send + 'a>> {
        Box::pin(async move {
            let mut cmd = tokio::process::Command::new(&self.command);
            cmd.arg("run")
                .arg(&self.model)
                .arg(prompt)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true);

            match tokio::time::timeout(self.timeout, cmd.output()).await {
                Err(_) => BackendOutcome::TimedOut,
                Ok(Err(_)) => BackendOutcome::Unavailable,
                Ok(Ok(out)) => {
                    if !out.status.success() {
                        return BackendOutcome::Unavailable;
                    }
                    let text = String::from_utf8_lossy(&out.stdout).trim().to_string();
                    if text.is_empty() {
                        BackendOutcome::Unavailable
                    } else {
                        BackendOutcome::Reply(text)
                    }
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

// ------------------------------------------------------------
// Mock backend (tests/local dry runs)
// ------------------------------------------------------------

/// Scripted backend returning a fixed outcome.
#[derive(Clone)]
pub struct MockBackend {
    pub fixed: BackendOutcome,
}

impl MockBackend {
    pub fn replying(text: &str) -> Self {
        Self {
            fixed: BackendOutcome::Reply(text.to_string()),
        }
    }
}

impl AssistantBackend for MockBackend {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = BackendOutcome> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
