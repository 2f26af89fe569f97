//! Advisory workflows and the collaborator interfaces they consume.
//!
//! The pipeline itself never touches storage. These workflows look up the
//! inputs, run the orchestrator, and hand the result to an [`ArtifactSink`].
//! Lookups that miss surface as [`AdvisorError::NotFound`]; malformed input
//! surfaces as [`AdvisorError::Validation`]. Upstream completion failures do
//! not error: they arrive as degraded results and [`FailurePolicy`] decides
//! what happens to them.

use std::future::Future;

use advisor_completion::CompletionClient;
use advisor_shared::{
    AdvisorError, AgentKind, GenerationRequest, GenerationResult, ProfileContext, Result, TagList,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::orchestrator::GenerationOrchestrator;

/// Points awarded for posting an answer.
pub const ANSWER_POINTS: i64 = 5;

// ---------------------------------------------------------------------------
// Records exchanged with collaborators
// ---------------------------------------------------------------------------

/// Identifier of a persisted artifact (UUID v7, time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(pub Uuid);

impl ArtifactId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ArtifactId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An artifact ready to be persisted against a profile.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtifact {
    pub kind: AgentKind,
    pub profile_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub succeeded: bool,
}

impl NewArtifact {
    pub fn from_result(profile_id: i64, result: &GenerationResult) -> Self {
        Self {
            kind: result.kind,
            profile_id,
            title: result.title.clone(),
            content: result.content.clone(),
            succeeded: result.succeeded,
        }
    }
}

/// A persisted artifact as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArtifact {
    pub id: ArtifactId,
    pub kind: AgentKind,
    pub profile_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub succeeded: bool,
}

/// A community question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: TagList,
}

/// A question about to be posted. Missing tags are filled by the classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub tags: Option<TagList>,
}

// ---------------------------------------------------------------------------
// Collaborator interfaces
// ---------------------------------------------------------------------------

/// Read access to organization profiles.
pub trait ProfileDirectory: Send + Sync {
    fn find_profile(
        &self,
        profile_id: i64,
    ) -> impl Future<Output = Result<Option<ProfileContext>>> + Send;
}

/// Persistence sink for generated artifacts.
pub trait ArtifactSink: Send + Sync {
    fn store_artifact(&self, artifact: NewArtifact)
    -> impl Future<Output = Result<ArtifactId>> + Send;
}

/// Community Q&A storage.
pub trait QuestionBoard: Send + Sync {
    fn find_question(&self, question_id: i64)
    -> impl Future<Output = Result<Option<Question>>> + Send;

    fn create_question(&self, question: NewQuestion) -> impl Future<Output = Result<Question>> + Send;
}

/// Gamification counter. Implementations own their locking discipline.
pub trait PointsLedger: Send + Sync {
    /// Add `amount` to the user's score and return the new total.
    fn increment(&self, user_id: i64, amount: i64) -> impl Future<Output = Result<i64>> + Send;
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

/// What to do with a degraded strategy/outreach result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Persist and return the failure artifact so the interaction continues.
    #[default]
    PersistDegraded,
    /// Persist nothing and return [`AdvisorError::Generation`].
    RejectDegraded,
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Advisory workflows over an orchestrator and a store.
pub struct AdvisoryService<C, S> {
    orchestrator: GenerationOrchestrator<C>,
    store: S,
    policy: FailurePolicy,
}

impl<C, S> AdvisoryService<C, S>
where
    C: CompletionClient,
    S: ProfileDirectory + ArtifactSink + QuestionBoard + PointsLedger,
{
    pub fn new(orchestrator: GenerationOrchestrator<C>, store: S) -> Self {
        Self {
            orchestrator,
            store,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator<C> {
        &self.orchestrator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Generate and persist a fundraising strategy for a stored profile.
    #[instrument(skip_all, fields(profile_id = profile_id))]
    pub async fn generate_strategy(&self, profile_id: i64, query: &str) -> Result<StoredArtifact> {
        self.generate_for_profile(AgentKind::Strategy, profile_id, query)
            .await
    }

    /// Generate and persist an outreach draft for a stored profile.
    #[instrument(skip_all, fields(profile_id = profile_id))]
    pub async fn generate_outreach(&self, profile_id: i64, goal: &str) -> Result<StoredArtifact> {
        self.generate_for_profile(AgentKind::Outreach, profile_id, goal)
            .await
    }

    async fn generate_for_profile(
        &self,
        kind: AgentKind,
        profile_id: i64,
        free_text: &str,
    ) -> Result<StoredArtifact> {
        let profile = self
            .store
            .find_profile(profile_id)
            .await?
            .ok_or_else(|| AdvisorError::not_found("profile", profile_id))?;

        let request = self
            .orchestrator
            .configured(GenerationRequest::new(kind, Some(profile), free_text)?);
        let result = self.orchestrator.generate(&request).await;

        if !result.succeeded && self.policy == FailurePolicy::RejectDegraded {
            let detail = result.error_detail.unwrap_or_default();
            warn!(%kind, profile_id, %detail, "rejecting degraded generation");
            return Err(AdvisorError::Generation(detail));
        }

        let id = self
            .store
            .store_artifact(NewArtifact::from_result(profile_id, &result))
            .await?;

        info!(%kind, profile_id, %id, succeeded = result.succeeded, "artifact stored");

        Ok(StoredArtifact {
            id,
            kind,
            profile_id,
            title: result.title,
            content: result.content,
            succeeded: result.succeeded,
        })
    }

    /// Post a question, classifying it when no tags were supplied.
    #[instrument(skip_all, fields(user_id = question.user_id))]
    pub async fn post_question(&self, mut question: NewQuestion) -> Result<Question> {
        if question.title.trim().is_empty() {
            return Err(AdvisorError::validation("question title must not be blank"));
        }
        if question.content.trim().is_empty() {
            return Err(AdvisorError::validation("question content must not be blank"));
        }
        if let Some(tags) = &question.tags {
            tags.validate()?;
        }

        if question.tags.as_ref().is_none_or(TagList::is_empty) {
            let tags = self.orchestrator.classify_tags(&question.content).await;
            info!(tags = %tags.to_csv(), "question classified");
            question.tags = Some(tags);
        }

        self.store.create_question(question).await
    }

    /// Suggested answer for a stored question.
    #[instrument(skip_all, fields(question_id = question_id))]
    pub async fn suggested_answer(&self, question_id: i64) -> Result<String> {
        let question = self
            .store
            .find_question(question_id)
            .await?
            .ok_or_else(|| AdvisorError::not_found("question", question_id))?;

        Ok(self.orchestrator.suggest_answer(&question.content).await)
    }

    /// Suggested mentor reply to a mentee message.
    pub async fn suggested_reply(&self, message: &str) -> String {
        self.orchestrator.suggest_reply(message).await
    }

    /// Credit a user for answering a question.
    pub async fn award_answer_points(&self, user_id: i64) -> Result<i64> {
        self.store.increment(user_id, ANSWER_POINTS).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use advisor_completion::CompletionError;

    use super::*;
    use crate::testing::ScriptedClient;

    /// Minimal in-test store.
    #[derive(Default)]
    struct FakeStore {
        profiles: HashMap<i64, ProfileContext>,
        questions: Mutex<Vec<Question>>,
        artifacts: Mutex<Vec<NewArtifact>>,
        points: Mutex<HashMap<i64, i64>>,
    }

    impl ProfileDirectory for FakeStore {
        async fn find_profile(&self, profile_id: i64) -> Result<Option<ProfileContext>> {
            Ok(self.profiles.get(&profile_id).cloned())
        }
    }

    impl ArtifactSink for FakeStore {
        async fn store_artifact(&self, artifact: NewArtifact) -> Result<ArtifactId> {
            self.artifacts.lock().unwrap().push(artifact);
            Ok(ArtifactId::new())
        }
    }

    impl QuestionBoard for FakeStore {
        async fn find_question(&self, question_id: i64) -> Result<Option<Question>> {
            Ok(self
                .questions
                .lock()
                .unwrap()
                .iter()
                .find(|q| q.id == question_id)
                .cloned())
        }

        async fn create_question(&self, question: NewQuestion) -> Result<Question> {
            let mut questions = self.questions.lock().unwrap();
            let stored = Question {
                id: questions.len() as i64 + 1,
                user_id: question.user_id,
                title: question.title,
                content: question.content,
                tags: question.tags.unwrap_or_default(),
            };
            questions.push(stored.clone());
            Ok(stored)
        }
    }

    impl PointsLedger for FakeStore {
        async fn increment(&self, user_id: i64, amount: i64) -> Result<i64> {
            let mut points = self.points.lock().unwrap();
            let score = points.entry(user_id).or_insert(0);
            *score += amount;
            Ok(*score)
        }
    }

    fn store_with_acme() -> FakeStore {
        let mut store = FakeStore::default();
        store.profiles.insert(1, ProfileContext::new("Acme", "Help"));
        store
    }

    fn service(client: ScriptedClient) -> AdvisoryService<ScriptedClient, FakeStore> {
        AdvisoryService::new(GenerationOrchestrator::new(client), store_with_acme())
    }

    fn new_question(tags: Option<TagList>) -> NewQuestion {
        NewQuestion {
            user_id: 7,
            title: "Grant writing".into(),
            content: "How do I write my first grant?".into(),
            tags,
        }
    }

    #[tokio::test]
    async fn strategy_is_generated_and_persisted() {
        let svc = service(ScriptedClient::ok("  Grow via email.  "));
        let stored = svc.generate_strategy(1, "How to grow donors?").await.unwrap();

        assert_eq!(stored.title.as_deref(), Some("Strategy for: How to grow donors?"));
        assert_eq!(stored.content, "Grow via email.");
        assert!(stored.succeeded);

        let artifacts = svc.store().artifacts.lock().unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].kind, AgentKind::Strategy);
        assert_eq!(artifacts[0].profile_id, 1);
    }

    #[tokio::test]
    async fn missing_profile_is_not_found_and_skips_generation() {
        let svc = service(ScriptedClient::ok("unused"));
        let err = svc.generate_outreach(99, "Find sponsors").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(svc.orchestrator().client().requests().is_empty());
        assert!(svc.store().artifacts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn degraded_result_is_persisted_by_default() {
        let svc = service(ScriptedClient::err(CompletionError::Timeout));
        let stored = svc.generate_outreach(1, "Find sponsors").await.unwrap();
        assert!(!stored.succeeded);
        assert_eq!(stored.title.as_deref(), Some("Outreach generation failed"));
        assert_eq!(stored.content, "An error occurred: timeout");
        assert_eq!(svc.store().artifacts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reject_policy_surfaces_generation_error() {
        let svc = service(ScriptedClient::err(CompletionError::Timeout))
            .with_policy(FailurePolicy::RejectDegraded);
        let err = svc.generate_strategy(1, "q").await.unwrap_err();
        assert!(matches!(err, AdvisorError::Generation(ref d) if d == "timeout"));
        assert!(svc.store().artifacts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn untagged_question_is_classified() {
        let svc = service(ScriptedClient::ok("Grants, Writing, Funding"));
        let question = svc.post_question(new_question(None)).await.unwrap();
        assert_eq!(question.tags.to_csv(), "grants,writing,funding");
    }

    #[tokio::test]
    async fn classification_failure_still_tags_question() {
        let svc = service(ScriptedClient::err(CompletionError::EmptyChoices));
        let question = svc
            .post_question(new_question(Some(TagList::default())))
            .await
            .unwrap();
        assert_eq!(question.tags.to_csv(), "general,question,nonprofit");
    }

    #[tokio::test]
    async fn supplied_tags_skip_classification() {
        let svc = service(ScriptedClient::ok("unused"));
        let question = svc
            .post_question(new_question(Some(TagList::from(["board"]))))
            .await
            .unwrap();
        assert_eq!(question.tags.to_csv(), "board");
        assert!(svc.orchestrator().client().requests().is_empty());
    }

    #[tokio::test]
    async fn whitespace_only_tags_are_classified() {
        let svc = service(ScriptedClient::ok("grants,board,funding"));
        let question = svc
            .post_question(new_question(Some(TagList::new(vec!["  ".into()]))))
            .await
            .unwrap();
        assert_eq!(question.tags.to_csv(), "grants,board,funding");
        assert_eq!(svc.orchestrator().client().requests().len(), 1);
    }

    #[tokio::test]
    async fn comma_in_supplied_tag_is_rejected() {
        let svc = service(ScriptedClient::ok("unused"));
        let err = svc
            .post_question(new_question(Some(TagList::from(["grants, board"]))))
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::Validation { .. }));
        assert!(svc.store().questions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_question_is_rejected() {
        let svc = service(ScriptedClient::ok("unused"));
        let mut question = new_question(None);
        question.content = "  ".into();
        let err = svc.post_question(question).await.unwrap_err();
        assert!(matches!(err, AdvisorError::Validation { .. }));
    }

    #[tokio::test]
    async fn suggested_answer_requires_existing_question() {
        let svc = service(ScriptedClient::new([
            Ok("board".to_string()),
            Ok(" Start with a local foundation. ".to_string()),
        ]));
        let err = svc.suggested_answer(42).await.unwrap_err();
        assert!(err.is_not_found());

        let question = svc.post_question(new_question(None)).await.unwrap();
        let answer = svc.suggested_answer(question.id).await.unwrap();
        assert_eq!(answer, "Start with a local foundation.");

        let sent = svc.orchestrator().client().requests();
        assert!(sent[1].messages[1].content.contains("How do I write my first grant?"));
    }

    #[tokio::test]
    async fn suggested_reply_degrades_to_apology() {
        let svc = service(ScriptedClient::err(CompletionError::Timeout));
        let reply = svc.suggested_reply("I feel stuck").await;
        assert!(reply.starts_with("Sorry"));
    }

    #[tokio::test]
    async fn answer_points_accumulate() {
        let svc = service(ScriptedClient::default());
        assert_eq!(svc.award_answer_points(3).await.unwrap(), 5);
        assert_eq!(svc.award_answer_points(3).await.unwrap(), 10);
        assert_eq!(svc.award_answer_points(4).await.unwrap(), 5);
    }
}
