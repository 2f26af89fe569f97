//! Per-kind agent table.
//!
//! The five generation intents share one pipeline; everything that differs
//! between them is data in [`AgentSpec`].

use advisor_shared::AgentKind;

/// Tags used when classification cannot run. A question is never left untagged.
pub const DEFAULT_TAGS: &str = "general,question,nonprofit";

/// How the user message is built for a kind.
#[derive(Debug, Clone, Copy)]
pub enum PromptShape {
    /// Profile sections followed by the caller's goal or question.
    Profile {
        intro: &'static str,
        query_label: &'static str,
        closing: &'static str,
    },
    /// Fixed instructions around the raw text, quoted verbatim.
    Framed {
        preamble: &'static str,
        text_label: &'static str,
        postscript: Option<&'static str>,
    },
}

/// What a degraded result looks like for a kind.
#[derive(Debug, Clone, Copy)]
pub enum FailureContent {
    /// Titled failure artifact carrying the error reason.
    Reported { title: &'static str },
    /// Fixed substitute text; the reason is only logged and kept in `error_detail`.
    Substitute(&'static str),
}

/// Static configuration for one agent kind.
#[derive(Debug, Clone, Copy)]
pub struct AgentSpec {
    pub kind: AgentKind,
    pub system_prompt: &'static str,
    pub prompt: PromptShape,
    /// Label prefixed to the query to form the artifact title.
    pub title_label: Option<&'static str>,
    pub failure: FailureContent,
}

static AGENTS: [AgentSpec; 5] = [
    AgentSpec {
        kind: AgentKind::Strategy,
        system_prompt: "You are a nonprofit fundraising strategist who gives concrete, actionable advice.",
        prompt: PromptShape::Profile {
            intro: "You are an expert fundraising strategist for nonprofits.\n\
                    Develop a practical, step-by-step strategy tailored to the organization below.",
            query_label: "Question",
            closing: "Ground every recommendation in the organization's mission, audience, and past experience.",
        },
        title_label: Some("Strategy for: "),
        failure: FailureContent::Reported {
            title: "Strategy generation failed",
        },
    },
    AgentSpec {
        kind: AgentKind::Outreach,
        system_prompt: "You help nonprofits write professional outreach messages.",
        prompt: PromptShape::Profile {
            intro: "You are an expert outreach agent for nonprofits.\n\
                    Create a compelling outreach email or message for the organization below.",
            query_label: "Goal",
            closing: "Highlight their strengths, especially sustainability and community impact.",
        },
        title_label: Some("Outreach Draft for: "),
        failure: FailureContent::Reported {
            title: "Outreach generation failed",
        },
    },
    AgentSpec {
        kind: AgentKind::TagClassification,
        system_prompt: "You are a smart tag classifier for nonprofit questions.",
        prompt: PromptShape::Framed {
            preamble: "Classify this question into exactly 3 relevant tags (comma-separated). \
                       Be concise and use lowercase.",
            text_label: "Question",
            postscript: Some("Example tags: fundraising, donors, strategy\nOnly return comma-separated tags."),
        },
        title_label: None,
        failure: FailureContent::Substitute(DEFAULT_TAGS),
    },
    AgentSpec {
        kind: AgentKind::AnswerSuggestion,
        system_prompt: "You are a helpful assistant for nonprofit Q&A.",
        prompt: PromptShape::Framed {
            preamble: "You are an expert advisor for nonprofit organizations.\n\n\
                       Based on this question, suggest a clear and helpful answer that a nonprofit leader could implement.",
            text_label: "Question",
            postscript: None,
        },
        title_label: None,
        failure: FailureContent::Substitute(
            "Sorry, the AI could not generate a suggestion at this time.",
        ),
    },
    AgentSpec {
        kind: AgentKind::ReplySuggestion,
        system_prompt: "You are an AI assistant for nonprofit mentorship conversations.",
        prompt: PromptShape::Framed {
            preamble: "You are an experienced nonprofit mentor.\n\n\
                       A mentee sent the message below. Suggest a supportive, practical reply the mentor could send.",
            text_label: "Message",
            postscript: Some("Keep the reply concise and do not include personal details."),
        },
        title_label: None,
        failure: FailureContent::Substitute(
            "Sorry, the AI could not generate a reply suggestion at this time.",
        ),
    },
];

/// Look up the table entry for `kind`.
pub fn spec_for(kind: AgentKind) -> &'static AgentSpec {
    let idx = match kind {
        AgentKind::Strategy => 0,
        AgentKind::Outreach => 1,
        AgentKind::TagClassification => 2,
        AgentKind::AnswerSuggestion => 3,
        AgentKind::ReplySuggestion => 4,
    };
    &AGENTS[idx]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_kind_in_order() {
        for kind in AgentKind::ALL {
            assert_eq!(spec_for(kind).kind, kind);
        }
    }

    #[test]
    fn only_profile_kinds_have_titles() {
        for kind in AgentKind::ALL {
            let spec = spec_for(kind);
            assert_eq!(spec.title_label.is_some(), kind.requires_profile(), "{kind}");
            assert_eq!(
                matches!(spec.prompt, PromptShape::Profile { .. }),
                kind.requires_profile(),
                "{kind}"
            );
        }
    }

    #[test]
    fn failure_labels_follow_kind_name() {
        match spec_for(AgentKind::Strategy).failure {
            FailureContent::Reported { title } => assert_eq!(title, "Strategy generation failed"),
            other => panic!("unexpected {other:?}"),
        }
        match spec_for(AgentKind::TagClassification).failure {
            FailureContent::Substitute(text) => assert_eq!(text, DEFAULT_TAGS),
            other => panic!("unexpected {other:?}"),
        }
    }
}
