//! Generative-text provider client.
//!
//! [`TextGenerator`] is the seam the pipeline talks through; [`GeminiClient`]
//! is the real implementation against the Gemini `generateContent` endpoint.
//! One attempt per invocation -- no retries, no backoff.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::debug;

/// Failures from a provider invocation.
///
/// Both variants are infrastructure problems and propagate to the caller;
/// malformed *content* in a successful response is the parser's concern.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success HTTP status.
    #[error("provider returned HTTP {status}: {body}")]
    Provider { status: u16, body: String },

    /// The provider could not be reached (connect failure, timeout).
    #[error("transport error reaching provider: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A service that turns a prompt into generated text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send `prompt` and return the raw response body.
    ///
    /// The body is opaque at this layer; interpreting it is the response
    /// parser's job.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the Gemini client.
///
/// The credential is never hard-coded; it comes from the config file or the
/// `GEMINI_API_KEY` environment variable.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API credential, sent as the `key` query parameter.
    pub api_key: String,
    /// Model name, e.g. `gemini-2.0-flash`.
    pub model: String,
    /// Base URL of the generative-language API.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of concurrent in-flight provider calls.
    pub max_in_flight: usize,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
    pub const DEFAULT_MAX_IN_FLIGHT: usize = 4;

    /// Build a config with the given credential and defaults for the rest.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout_secs: Self::DEFAULT_TIMEOUT_SECS,
            max_in_flight: Self::DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Apply `TASKPLAN_GEMINI_MODEL` and `TASKPLAN_GEMINI_BASE_URL` overrides
    /// from the environment.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(model) = env::var("TASKPLAN_GEMINI_MODEL") {
            self.model = model;
        }
        if let Ok(base_url) = env::var("TASKPLAN_GEMINI_BASE_URL") {
            self.base_url = base_url;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

// The prompt is embedded via serde serialization, never string formatting, so
// quotes and control characters in the goal cannot corrupt the payload.

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
    /// Bounds concurrent provider calls; the provider is the latency- and
    /// failure-dominant step, so in-flight requests are capped.
    permits: Arc<Semaphore>,
}

impl GeminiClient {
    /// Build a client from a config.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        let permits = Arc::new(Semaphore::new(config.max_in_flight.max(1)));
        Ok(Self {
            http,
            config,
            permits,
        })
    }

    /// Endpoint URL without the credential, safe for logging.
    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        // The semaphore is never closed, so acquire cannot fail.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("provider semaphore closed");

        let url = self.endpoint();
        debug!(url = %url, model = %self.config.model, "calling provider");

        let request = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}
