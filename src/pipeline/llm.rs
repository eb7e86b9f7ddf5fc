//! The completion client: the single seam between the runner and the hosted
//! model.
//!
//! This module is intentionally thin — all prompt engineering lives in
//! [`crate::prompts`] so it can be changed without touching transport or
//! error-mapping logic here.
//!
//! There is deliberately no retry or backoff: a retry policy needs
//! idempotence assumptions and rate-limit handling that belong to the
//! caller, not the core. Every failure maps onto exactly one of the error
//! taxonomy's variants and propagates unmodified.

use crate::error::RaincheckError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Knobs for a single completion call.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature in [0, 2].
    pub temperature: f32,
    /// Output-length cap for this call.
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// One completion answer plus its token accounting.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The first choice's message content, verbatim — no post-processing.
    pub content: String,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A chat-completion capability.
///
/// The runner depends on this trait rather than a concrete HTTP client, so
/// tests can script answers and inject failures without network access, and
/// callers can wrap the real client with middleware (caching, their own
/// retry policy) without the core knowing.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Perform one request/response cycle against the model endpoint.
    ///
    /// # Errors
    /// * [`RaincheckError::Auth`] — credential missing or rejected
    /// * [`RaincheckError::Api`] — non-success status or malformed response
    /// * [`RaincheckError::Timeout`] — no response within the client deadline
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, RaincheckError>;
}

/// OpenAI-compatible chat-completion client.
///
/// One instance per run is plenty; the underlying `reqwest::Client` pools
/// connections across the nine section calls.
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    timeout_secs: u64,
}

impl OpenAiClient {
    /// Build a client with an explicit credential and endpoint.
    ///
    /// A `None` credential is accepted here — it surfaces as
    /// [`RaincheckError::Auth`] on the first [`complete`](CompletionClient::complete)
    /// call, *before* any request is issued, rather than as a deferred
    /// network failure.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, RaincheckError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RaincheckError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_secs,
        })
    }

    /// Read the credential and endpoint from the environment
    /// (`OPENAI_API_KEY`, `OPENAI_BASE_URL`).
    pub fn from_env(model: &str, timeout_secs: u64) -> Result<Self, RaincheckError> {
        let api_key = std::env::var("OPENAI_API_KEY").ok();
        let base_url = std::env::var("OPENAI_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(api_key, model, base_url, timeout_secs)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: ChatUsage,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        options: &CompletionOptions,
    ) -> Result<Completion, RaincheckError> {
        // Fail before touching the network when no credential exists.
        let key = self.api_key.as_deref().ok_or_else(|| RaincheckError::Auth {
            detail: "OPENAI_API_KEY is not set".into(),
        })?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": options.temperature,
            "max_tokens": options.max_tokens,
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RaincheckError::Timeout {
                        secs: self.timeout_secs,
                    }
                } else {
                    RaincheckError::Api {
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            let detail = response.text().await.unwrap_or_default();
            return Err(RaincheckError::Auth {
                detail: format!("HTTP {status}: {}", snippet(&detail)),
            });
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RaincheckError::Api {
                message: format!("HTTP {status}: {}", snippet(&detail)),
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| RaincheckError::Api {
            message: format!("malformed response body: {e}"),
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RaincheckError::Api {
                message: "response contains no choices".into(),
            })?;

        debug!(
            "Completion: {} prompt tokens, {} completion tokens",
            parsed.usage.prompt_tokens, parsed.usage.completion_tokens
        );

        Ok(Completion {
            content,
            prompt_tokens: parsed.usage.prompt_tokens,
            completion_tokens: parsed.usage.completion_tokens,
        })
    }
}

/// Trim long error bodies so they stay readable in one log line.
fn snippet(s: &str) -> String {
    let s = s.trim();
    match s.char_indices().nth(200) {
        Some((byte_idx, _)) => format!("{}…", &s[..byte_idx]),
        None => s.to_string(),
    }
}
