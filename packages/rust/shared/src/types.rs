//! Core domain types for advisory content generation.

use serde::{Deserialize, Serialize};

use crate::error::{AdvisorError, Result};

// ---------------------------------------------------------------------------
// AgentKind
// ---------------------------------------------------------------------------

/// The fixed generation intents the pipeline serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Strategy,
    Outreach,
    TagClassification,
    AnswerSuggestion,
    ReplySuggestion,
}

impl AgentKind {
    /// Every kind, in declaration order.
    pub const ALL: [AgentKind; 5] = [
        Self::Strategy,
        Self::Outreach,
        Self::TagClassification,
        Self::AnswerSuggestion,
        Self::ReplySuggestion,
    ];

    /// Stable key used in config tables and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strategy => "strategy",
            Self::Outreach => "outreach",
            Self::TagClassification => "tag_classification",
            Self::AnswerSuggestion => "answer_suggestion",
            Self::ReplySuggestion => "reply_suggestion",
        }
    }

    /// Strategy and outreach are rendered from an organization profile;
    /// the Q&A and mentorship kinds work on raw text only.
    pub fn requires_profile(&self) -> bool {
        matches!(self, Self::Strategy | Self::Outreach)
    }

    /// Sampling defaults observed for each kind.
    pub fn default_options(&self) -> GenerationOptions {
        let (temperature, max_tokens) = match self {
            Self::Strategy => (0.7, 800),
            Self::Outreach => (0.75, 800),
            Self::TagClassification => (0.4, 100),
            Self::AnswerSuggestion => (0.7, 500),
            Self::ReplySuggestion => (0.3, 500),
        };
        GenerationOptions {
            temperature,
            max_tokens,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = AdvisorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AdvisorError::validation(format!("unknown agent kind: {s}")))
    }
}

// ---------------------------------------------------------------------------
// TagList
// ---------------------------------------------------------------------------

/// Ordered list of short labels (service tags, question tags).
///
/// Kept as a list inside the domain; the comma-joined form only exists at
/// the persistence edge and when parsing classifier output. Every
/// constructor trims entries and drops blank ones, so a non-empty list
/// always carries at least one real tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new(tags: Vec<String>) -> Self {
        Self(
            tags.into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect(),
        )
    }

    /// Reject entries that cannot survive the comma-joined form.
    pub fn validate(&self) -> Result<()> {
        match self.0.iter().find(|tag| tag.contains(',')) {
            Some(tag) => Err(AdvisorError::validation(format!(
                "tag '{tag}' must not contain a comma"
            ))),
            None => Ok(()),
        }
    }

    /// Parse a comma-joined string. Entries are trimmed and empty entries
    /// dropped; order is preserved.
    pub fn from_csv(csv: &str) -> Self {
        Self(
            csv.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Like [`TagList::from_csv`], but lowercases every entry.
    pub fn normalized_from_csv(csv: &str) -> Self {
        Self(
            Self::from_csv(csv)
                .0
                .into_iter()
                .map(|tag| tag.to_lowercase())
                .collect(),
        )
    }

    /// Comma-joined form, no spaces.
    pub fn to_csv(&self) -> String {
        self.0.join(",")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Keep at most `n` leading tags.
    pub fn truncated(mut self, n: usize) -> Self {
        self.0.truncate(n);
        self
    }
}

impl From<Vec<String>> for TagList {
    fn from(tags: Vec<String>) -> Self {
        Self::new(tags)
    }
}

impl<const N: usize> From<[&str; N]> for TagList {
    fn from(tags: [&str; N]) -> Self {
        Self::new(tags.into_iter().map(String::from).collect())
    }
}

impl From<TagList> for Vec<String> {
    fn from(tags: TagList) -> Self {
        tags.0
    }
}

// ---------------------------------------------------------------------------
// ProfileContext
// ---------------------------------------------------------------------------

/// Read-only snapshot of the requesting organization's attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileContext {
    pub name: String,
    pub mission: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demographics: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub past_methods: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fundraising_goals: Option<String>,
    #[serde(default, skip_serializing_if = "TagList::is_empty")]
    pub service_tags: TagList,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability_practices: Option<String>,
}

impl ProfileContext {
    /// Create a profile with only the required fields populated.
    pub fn new(name: impl Into<String>, mission: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mission: mission.into(),
            demographics: None,
            past_methods: None,
            fundraising_goals: None,
            service_tags: TagList::default(),
            sustainability_practices: None,
        }
    }

    pub fn with_demographics(mut self, value: impl Into<String>) -> Self {
        self.demographics = Some(value.into());
        self
    }

    pub fn with_past_methods(mut self, value: impl Into<String>) -> Self {
        self.past_methods = Some(value.into());
        self
    }

    pub fn with_fundraising_goals(mut self, value: impl Into<String>) -> Self {
        self.fundraising_goals = Some(value.into());
        self
    }

    pub fn with_service_tags(mut self, tags: impl Into<TagList>) -> Self {
        self.service_tags = tags.into();
        self
    }

    pub fn with_sustainability_practices(mut self, value: impl Into<String>) -> Self {
        self.sustainability_practices = Some(value.into());
        self
    }

    /// Reject profiles missing a required field.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AdvisorError::validation("profile name must not be blank"));
        }
        if self.mission.trim().is_empty() {
            return Err(AdvisorError::validation("profile mission must not be blank"));
        }
        self.service_tags.validate()
    }
}

// ---------------------------------------------------------------------------
// GenerationOptions / GenerationRequest
// ---------------------------------------------------------------------------

/// Sampling parameters forwarded to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AdvisorError::validation(format!(
                "temperature {} out of range 0.0..=2.0",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(AdvisorError::validation("max_tokens must be positive"));
        }
        Ok(())
    }
}

/// A validated generation request. Construct through [`GenerationRequest::new`]
/// or one of the per-kind constructors.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    kind: AgentKind,
    profile: Option<ProfileContext>,
    free_text: String,
    options: GenerationOptions,
}

impl GenerationRequest {
    /// Build a request with the kind's default options.
    ///
    /// Strategy and outreach requests must carry a valid profile. Other kinds
    /// operate on `free_text` alone, so any profile passed is dropped.
    pub fn new(
        kind: AgentKind,
        profile: Option<ProfileContext>,
        free_text: impl Into<String>,
    ) -> Result<Self> {
        let profile = if kind.requires_profile() {
            let profile = profile.ok_or_else(|| {
                AdvisorError::validation(format!("{kind} requests require a profile"))
            })?;
            profile.validate()?;
            Some(profile)
        } else {
            None
        };

        Ok(Self {
            kind,
            profile,
            free_text: free_text.into(),
            options: kind.default_options(),
        })
    }

    pub fn strategy(profile: ProfileContext, query: impl Into<String>) -> Result<Self> {
        Self::new(AgentKind::Strategy, Some(profile), query)
    }

    pub fn outreach(profile: ProfileContext, goal: impl Into<String>) -> Result<Self> {
        Self::new(AgentKind::Outreach, Some(profile), goal)
    }

    pub fn tag_classification(question: impl Into<String>) -> Self {
        Self::text_only(AgentKind::TagClassification, question.into())
    }

    pub fn answer_suggestion(question: impl Into<String>) -> Self {
        Self::text_only(AgentKind::AnswerSuggestion, question.into())
    }

    pub fn reply_suggestion(message: impl Into<String>) -> Self {
        Self::text_only(AgentKind::ReplySuggestion, message.into())
    }

    fn text_only(kind: AgentKind, free_text: String) -> Self {
        Self {
            kind,
            profile: None,
            free_text,
            options: kind.default_options(),
        }
    }

    /// Replace the sampling options, rejecting out-of-range values.
    pub fn with_options(mut self, options: GenerationOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn profile(&self) -> Option<&ProfileContext> {
        self.profile.as_ref()
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn options(&self) -> GenerationOptions {
        self.options
    }
}

// ---------------------------------------------------------------------------
// GenerationResult
// ---------------------------------------------------------------------------

/// The artifact handed back to the caller for persistence or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub kind: AgentKind,
    /// Present only for kinds that produce titled artifacts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub content: String,
    pub succeeded: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl GenerationResult {
    /// Interpret `content` as a comma-separated tag list.
    pub fn tags(&self) -> TagList {
        TagList::normalized_from_csv(&self.content)
    }
}
