//! Chat-completion client for the advisory pipeline.
//!
//! [`CompletionClient`] is the seam the orchestrator depends on. The
//! production implementation, [`HttpCompletionClient`], speaks the
//! OpenAI-compatible `/chat/completions` protocol over HTTPS. Every failure
//! is returned as a [`CompletionError`] value; nothing escapes as a panic.

mod http;
mod protocol;

use std::future::Future;

pub use http::HttpCompletionClient;
pub use protocol::{ChatMessage, CompletionRequest, Role};

/// Outcome of one completion round trip.
pub type CompletionCallResult = std::result::Result<String, CompletionError>;

/// Why a completion call produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompletionError {
    /// The request did not finish within the configured timeout.
    #[error("timeout")]
    Timeout,

    /// Connection, TLS, or body transfer failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The body could not be decoded as a completion response.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// The `choices` array was present but empty.
    #[error("response contained no choices")]
    EmptyChoices,
}

/// A single chat-completion round trip against an externally configured model.
///
/// Implementations must resolve every failure to `Err` and must be safe to
/// share across concurrent requests.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = CompletionCallResult> + Send;
}
