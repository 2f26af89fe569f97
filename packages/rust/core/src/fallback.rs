//! Fallback policy: turn a pipeline failure into a degraded-but-valid result.
//!
//! Generation is advisory, so every kind returns something usable instead of
//! aborting the caller's transaction.

use advisor_shared::{AgentKind, GenerationResult};

use crate::agents::{FailureContent, spec_for};

/// Build the `succeeded = false` result for `kind`.
pub fn on_failure(kind: AgentKind, reason: &str) -> GenerationResult {
    let reason = match reason.trim() {
        "" => "unknown error",
        r => r,
    };

    let (title, content) = match spec_for(kind).failure {
        FailureContent::Reported { title } => {
            (Some(title.to_string()), format!("An error occurred: {reason}"))
        }
        FailureContent::Substitute(text) => (None, text.to_string()),
    };

    GenerationResult {
        kind,
        title,
        content,
        succeeded: false,
        error_detail: Some(reason.to_string()),
    }
}
