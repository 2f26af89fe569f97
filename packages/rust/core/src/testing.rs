//! Scripted completion client for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use advisor_completion::{
    CompletionCallResult, CompletionClient, CompletionError, CompletionRequest,
};

/// Replays queued results in order and records every request it receives.
#[derive(Default)]
pub(crate) struct ScriptedClient {
    responses: Mutex<VecDeque<CompletionCallResult>>,
    seen: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedClient {
    pub(crate) fn new(responses: impl IntoIterator<Item = CompletionCallResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn ok(text: &str) -> Self {
        Self::new([Ok(text.to_string())])
    }

    pub(crate) fn err(error: CompletionError) -> Self {
        Self::new([Err(error)])
    }

    pub(crate) fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl CompletionClient for ScriptedClient {
    async fn complete(&self, request: &CompletionRequest) -> CompletionCallResult {
        self.seen.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Transport("no scripted response".into())))
    }
}
