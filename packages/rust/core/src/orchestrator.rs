//! Generation orchestrator: the single public entry point of the pipeline.

use std::collections::HashMap;

use advisor_completion::{CompletionClient, CompletionRequest};
use advisor_shared::{AgentKind, GenerationOptions, GenerationRequest, GenerationResult, TagList};
use tracing::{debug, instrument, warn};

use crate::agents::{DEFAULT_TAGS, spec_for};
use crate::fallback::on_failure;
use crate::normalize::normalize;
use crate::prompt::compose;

/// Number of tags a classified question carries.
const TAG_COUNT: usize = 3;

/// Composes prompt → completion → normalization/fallback.
///
/// Holds only the injected client and read-only option overrides, so one
/// instance can serve concurrent requests through `&self` or an `Arc`.
pub struct GenerationOrchestrator<C> {
    client: C,
    options: HashMap<AgentKind, GenerationOptions>,
}

impl<C: CompletionClient> GenerationOrchestrator<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            options: HashMap::new(),
        }
    }

    /// Override the sampling options used by requests this orchestrator
    /// builds itself (the text-only helpers and the advisory workflows).
    pub fn with_options(mut self, kind: AgentKind, options: GenerationOptions) -> Self {
        self.options.insert(kind, options);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Effective options for `kind`.
    pub fn options_for(&self, kind: AgentKind) -> GenerationOptions {
        self.options
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_options())
    }

    /// Run one generation. Never fails: upstream errors become a degraded
    /// result with `succeeded = false`.
    #[instrument(skip_all, fields(kind = %request.kind()))]
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let kind = request.kind();
        let spec = spec_for(kind);
        let prompt = compose(kind, request.profile(), request.free_text());
        let options = request.options();

        let call = CompletionRequest::new(
            prompt.system,
            prompt.user,
            options.temperature,
            options.max_tokens,
        );

        match self.client.complete(&call).await {
            Ok(raw) => {
                let normalized = normalize(&raw, spec.title_label, request.free_text());
                debug!(chars = normalized.content.len(), "generation succeeded");
                GenerationResult {
                    kind,
                    title: normalized.title,
                    content: normalized.content,
                    succeeded: true,
                    error_detail: None,
                }
            }
            Err(e) => {
                warn!(error = %e, "generation failed, using fallback");
                on_failure(kind, &e.to_string())
            }
        }
    }

    /// Classify a question into lowercase tags. Falls back to the default
    /// set when the service fails or returns nothing usable.
    pub async fn classify_tags(&self, question: &str) -> TagList {
        let request = self.configured(GenerationRequest::tag_classification(question));
        let tags = self.generate(&request).await.tags().truncated(TAG_COUNT);
        if tags.is_empty() {
            debug!("classifier returned no tags, using defaults");
            return TagList::from_csv(DEFAULT_TAGS);
        }
        tags
    }

    /// Suggest an answer to a community question.
    pub async fn suggest_answer(&self, question: &str) -> String {
        let request = self.configured(GenerationRequest::answer_suggestion(question));
        self.generate(&request).await.content
    }

    /// Suggest a mentor reply to a mentee message.
    pub async fn suggest_reply(&self, message: &str) -> String {
        let request = self.configured(GenerationRequest::reply_suggestion(message));
        self.generate(&request).await.content
    }

    /// Apply this orchestrator's option overrides to a request it built.
    pub fn configured(&self, request: GenerationRequest) -> GenerationRequest {
        let options = self.options_for(request.kind());
        match request.clone().with_options(options) {
            Ok(configured) => configured,
            Err(e) => {
                warn!(kind = %request.kind(), error = %e, "ignoring invalid option override");
                request
            }
        }
    }
}
