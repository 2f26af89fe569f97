//! OpenAI-compatible HTTPS completion client.

use std::time::Instant;

use advisor_shared::{AdvisorError, CompletionSettings, Result};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::protocol::{CompletionRequest, WireRequest, WireResponse};
use crate::{CompletionCallResult, CompletionClient, CompletionError};

/// User-Agent string for completion requests.
const USER_AGENT: &str = concat!("advisor/", env!("CARGO_PKG_VERSION"));

/// Longest error body echoed back in [`CompletionError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 200;

/// Completion client backed by a long-lived `reqwest` connection pool.
///
/// Read-only after construction; share it behind `&` or `Arc` across tasks.
pub struct HttpCompletionClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpCompletionClient {
    /// Build a client from resolved settings. Fails only if the underlying
    /// HTTP client cannot be constructed.
    pub fn new(settings: CompletionSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| AdvisorError::config(format!("failed to build HTTP client: {e}")))?;

        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.as_str().trim_end_matches('/')
        );

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key,
            model: settings.model,
        })
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the completion endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn round_trip(&self, request: &CompletionRequest) -> CompletionCallResult {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&WireRequest::new(&self.model, request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let bytes = response.bytes().await.map_err(map_transport_error)?;
        let parsed: WireResponse = serde_json::from_slice(&bytes)
            .map_err(|e| CompletionError::Malformed(e.to_string()))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion usage"
            );
        }

        parsed.into_text()
    }
}

impl CompletionClient for HttpCompletionClient {
    #[instrument(skip_all, fields(model = %self.model, max_tokens = request.max_tokens))]
    async fn complete(&self, request: &CompletionRequest) -> CompletionCallResult {
        let start = Instant::now();
        let result = self.round_trip(request).await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(text) => debug!(latency_ms, chars = text.len(), "completion succeeded"),
            Err(e) => warn!(latency_ms, error = %e, "completion failed"),
        }

        result
    }
}

fn map_transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Transport(e.to_string())
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
