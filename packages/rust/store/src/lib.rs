//! In-process store implementing the advisory collaborator interfaces.
//!
//! The [`MemoryStore`] keeps profiles, generated artifacts, community
//! questions, and the points ledger behind a single async lock. It stands
//! in for the relational store the workflows are normally wired to, and is
//! what the CLI and the workflow tests run against.

pub mod records;

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use advisor_core::service::{
    ArtifactId, ArtifactSink, NewArtifact, NewQuestion, PointsLedger, ProfileDirectory, Question,
    QuestionBoard, StoredArtifact,
};
use advisor_shared::{AdvisorError, ProfileContext, Result};
use tokio::sync::RwLock;
use tracing::debug;

use crate::records::{ArtifactRecord, ProfileRecord, QuestionRecord};

#[derive(Debug, Default)]
struct Tables {
    profiles: BTreeMap<i64, ProfileRecord>,
    artifacts: Vec<ArtifactRecord>,
    questions: BTreeMap<i64, QuestionRecord>,
    points: HashMap<i64, i64>,
    next_profile_id: i64,
    next_question_id: i64,
}

/// Primary store handle. Cheap to share behind `&`; all mutation goes
/// through the internal lock, so ledger increments never lose updates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Profile operations
    // -----------------------------------------------------------------------

    /// Insert a validated profile and return its id.
    pub async fn insert_profile(&self, profile: &ProfileContext) -> Result<i64> {
        profile.validate()?;
        let mut tables = self.tables.write().await;
        tables.next_profile_id += 1;
        let id = tables.next_profile_id;
        tables
            .profiles
            .insert(id, ProfileRecord::from_profile(id, profile));
        debug!(id, name = %profile.name, "profile inserted");
        Ok(id)
    }

    // -----------------------------------------------------------------------
    // Artifact operations
    // -----------------------------------------------------------------------

    /// All artifacts generated for a profile, newest first.
    pub async fn artifacts_for_profile(&self, profile_id: i64) -> Vec<StoredArtifact> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&ArtifactRecord> = tables
            .artifacts
            .iter()
            .filter(|a| a.profile_id == profile_id)
            .collect();
        // v7 ids break ties within one clock tick
        rows.sort_by_key(|a| Reverse((a.created_at, a.id.0)));
        rows.into_iter().map(ArtifactRecord::to_stored).collect()
    }

    // -----------------------------------------------------------------------
    // Q&A operations
    // -----------------------------------------------------------------------

    /// All questions, in posting order.
    pub async fn list_questions(&self) -> Vec<Question> {
        self.tables
            .read()
            .await
            .questions
            .values()
            .map(QuestionRecord::to_question)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Points
    // -----------------------------------------------------------------------

    /// Current score for a user. Users who never earned points are not found.
    pub async fn score(&self, user_id: i64) -> Result<i64> {
        self.tables
            .read()
            .await
            .points
            .get(&user_id)
            .copied()
            .ok_or_else(|| AdvisorError::not_found("points", user_id))
    }
}

impl ProfileDirectory for MemoryStore {
    async fn find_profile(&self, profile_id: i64) -> Result<Option<ProfileContext>> {
        Ok(self
            .tables
            .read()
            .await
            .profiles
            .get(&profile_id)
            .map(ProfileRecord::to_profile))
    }
}

impl ArtifactSink for MemoryStore {
    async fn store_artifact(&self, artifact: NewArtifact) -> Result<ArtifactId> {
        if !artifact.succeeded && artifact.content.trim().is_empty() {
            return Err(AdvisorError::Storage(
                "refusing to store a failed artifact without content".into(),
            ));
        }
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&artifact.profile_id) {
            return Err(AdvisorError::not_found("profile", artifact.profile_id));
        }
        let record = ArtifactRecord::new(artifact);
        let id = record.id;
        tables.artifacts.push(record);
        Ok(id)
    }
}

impl QuestionBoard for MemoryStore {
    async fn find_question(&self, question_id: i64) -> Result<Option<Question>> {
        Ok(self
            .tables
            .read()
            .await
            .questions
            .get(&question_id)
            .map(QuestionRecord::to_question))
    }

    async fn create_question(&self, question: NewQuestion) -> Result<Question> {
        if let Some(tags) = &question.tags {
            tags.validate()?;
        }
        let mut tables = self.tables.write().await;
        tables.next_question_id += 1;
        let id = tables.next_question_id;
        let record = QuestionRecord::from_new(id, &question);
        let stored = record.to_question();
        tables.questions.insert(id, record);
        Ok(stored)
    }
}

impl PointsLedger for MemoryStore {
    async fn increment(&self, user_id: i64, amount: i64) -> Result<i64> {
        let mut tables = self.tables.write().await;
        let score = tables.points.entry(user_id).or_insert(0);
        *score += amount;
        Ok(*score)
    }
}
