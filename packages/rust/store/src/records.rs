//! Row shapes kept by the store.
//!
//! These mirror the relational columns the advisory data lives in. List
//! fields are comma-joined here and nowhere else; converting to and from the
//! domain types is the adapter's job.

use advisor_core::service::{ArtifactId, NewArtifact, NewQuestion, Question, StoredArtifact};
use advisor_shared::{AgentKind, ProfileContext, TagList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `nonprofit_profiles` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: i64,
    pub name: String,
    pub mission: String,
    pub demographics: Option<String>,
    pub past_methods: Option<String>,
    pub fundraising_goals: Option<String>,
    /// Comma-joined; `None` when the profile has no tags.
    pub service_tags: Option<String>,
    pub sustainability_practices: Option<String>,
}

impl ProfileRecord {
    pub fn from_profile(id: i64, profile: &ProfileContext) -> Self {
        Self {
            id,
            name: profile.name.clone(),
            mission: profile.mission.clone(),
            demographics: profile.demographics.clone(),
            past_methods: profile.past_methods.clone(),
            fundraising_goals: profile.fundraising_goals.clone(),
            service_tags: encode_tags(&profile.service_tags),
            sustainability_practices: profile.sustainability_practices.clone(),
        }
    }

    pub fn to_profile(&self) -> ProfileContext {
        ProfileContext {
            name: self.name.clone(),
            mission: self.mission.clone(),
            demographics: self.demographics.clone(),
            past_methods: self.past_methods.clone(),
            fundraising_goals: self.fundraising_goals.clone(),
            service_tags: decode_tags(self.service_tags.as_deref()),
            sustainability_practices: self.sustainability_practices.clone(),
        }
    }
}

/// `strategies` / `outreach_drafts` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub id: ArtifactId,
    pub kind: AgentKind,
    pub profile_id: i64,
    pub title: Option<String>,
    pub content: String,
    pub succeeded: bool,
    pub created_at: DateTime<Utc>,
}

impl ArtifactRecord {
    pub fn new(artifact: NewArtifact) -> Self {
        Self {
            id: ArtifactId::new(),
            kind: artifact.kind,
            profile_id: artifact.profile_id,
            title: artifact.title,
            content: artifact.content,
            succeeded: artifact.succeeded,
            created_at: Utc::now(),
        }
    }

    pub fn to_stored(&self) -> StoredArtifact {
        StoredArtifact {
            id: self.id,
            kind: self.kind,
            profile_id: self.profile_id,
            title: self.title.clone(),
            content: self.content.clone(),
            succeeded: self.succeeded,
        }
    }
}

/// `questions` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    /// Comma-joined; `None` when untagged.
    pub tags: Option<String>,
}

impl QuestionRecord {
    pub fn from_new(id: i64, question: &NewQuestion) -> Self {
        Self {
            id,
            user_id: question.user_id,
            title: question.title.clone(),
            content: question.content.clone(),
            tags: question.tags.as_ref().and_then(encode_tags),
        }
    }

    pub fn to_question(&self) -> Question {
        Question {
            id: self.id,
            user_id: self.user_id,
            title: self.title.clone(),
            content: self.content.clone(),
            tags: decode_tags(self.tags.as_deref()),
        }
    }
}

fn encode_tags(tags: &TagList) -> Option<String> {
    (!tags.is_empty()).then(|| tags.to_csv())
}

fn decode_tags(column: Option<&str>) -> TagList {
    column.map(TagList::from_csv).unwrap_or_default()
}
