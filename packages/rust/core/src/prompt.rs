//! Prompt composition: profile + free text → system/user message pair.

use std::fmt::Write as _;

use advisor_shared::{AgentKind, ProfileContext};

use crate::agents::{PromptShape, spec_for};

/// The two messages sent to the completion service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Render the messages for `kind`. Pure; never fails.
///
/// Profile-driven kinds list every populated profile field under a fixed
/// label. Absent or blank optional fields are skipped entirely.
pub fn compose(kind: AgentKind, profile: Option<&ProfileContext>, free_text: &str) -> PromptPair {
    let spec = spec_for(kind);

    let user = match spec.prompt {
        PromptShape::Profile {
            intro,
            query_label,
            closing,
        } => {
            let mut out = String::from(intro);
            out.push_str("\n\n");
            if let Some(profile) = profile {
                out.push_str(&profile_block(profile));
                out.push('\n');
            }
            let _ = writeln!(out, "{query_label}: {free_text}");
            out.push('\n');
            out.push_str(closing);
            out
        }
        PromptShape::Framed {
            preamble,
            text_label,
            postscript,
        } => {
            let mut out = String::from(preamble);
            let _ = write!(out, "\n---\n{text_label}: \"{free_text}\"\n---");
            if let Some(post) = postscript {
                out.push('\n');
                out.push_str(post);
            }
            out
        }
    };

    PromptPair {
        system: spec.system_prompt.to_string(),
        user,
    }
}

/// One `Label: value` line per populated profile field.
pub fn profile_block(profile: &ProfileContext) -> String {
    let tags = profile.service_tags.as_slice().join(", ");

    let fields: [(&str, Option<&str>); 7] = [
        ("Organization", Some(profile.name.as_str())),
        ("Mission", Some(profile.mission.as_str())),
        ("Target Demographics", profile.demographics.as_deref()),
        ("Past Fundraising Methods", profile.past_methods.as_deref()),
        ("Fundraising Goals", profile.fundraising_goals.as_deref()),
        ("Service Tags", Some(tags.as_str())),
        (
            "Sustainability Practices",
            profile.sustainability_practices.as_deref(),
        ),
    ];

    let mut out = String::new();
    for (label, value) in fields {
        if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
            let _ = writeln!(out, "{label}: {value}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> ProfileContext {
        ProfileContext::new("Green Roots", "Urban gardening for food security")
            .with_demographics("Low-income families")
            .with_past_methods("Bake sales, small grants")
            .with_fundraising_goals("$50k for a greenhouse")
            .with_service_tags(["education", "youth"])
            .with_sustainability_practices("Composting, rainwater capture")
    }

    #[test]
    fn strategy_prompt_includes_every_populated_field_and_query() {
        let pair = compose(
            AgentKind::Strategy,
            Some(&full_profile()),
            "How to grow donors?",
        );
        for expected in [
            "Organization: Green Roots",
            "Mission: Urban gardening for food security",
            "Target Demographics: Low-income families",
            "Past Fundraising Methods: Bake sales, small grants",
            "Fundraising Goals: $50k for a greenhouse",
            "Service Tags: education, youth",
            "Sustainability Practices: Composting, rainwater capture",
            "Question: How to grow donors?",
        ] {
            assert!(pair.user.contains(expected), "missing {expected:?}");
        }
        assert!(pair.system.contains("strategist"));
    }

    #[test]
    fn minimal_profile_renders_no_placeholder_lines() {
        let profile = ProfileContext::new("Acme", "Help");
        let block = profile_block(&profile);
        assert_eq!(block, "Organization: Acme\nMission: Help\n");

        let pair = compose(AgentKind::Outreach, Some(&profile), "Find sponsors");
        for absent in [
            "Target Demographics",
            "Past Fundraising Methods",
            "Fundraising Goals",
            "Service Tags",
            "Sustainability Practices",
            "None",
            "null",
        ] {
            assert!(!pair.user.contains(absent), "unexpected {absent:?}");
        }
        for line in pair.user.lines() {
            if let Some((_, value)) = line.split_once(": ") {
                assert!(!value.trim().is_empty(), "blank field line {line:?}");
            }
        }
        assert!(pair.user.contains("Goal: Find sponsors"));
    }

    #[test]
    fn blank_optional_field_is_skipped() {
        let profile = ProfileContext::new("Acme", "Help").with_demographics("   ");
        assert!(!profile_block(&profile).contains("Target Demographics"));
    }

    #[test]
    fn tag_prompt_ignores_profile_and_quotes_question() {
        let pair = compose(
            AgentKind::TagClassification,
            Some(&full_profile()),
            "How do we find corporate sponsors?",
        );
        assert!(pair.user.contains("Question: \"How do we find corporate sponsors?\""));
        assert!(pair.user.contains("3 relevant tags"));
        assert!(pair.user.contains("lowercase"));
        assert!(!pair.user.contains("Green Roots"));
    }

    #[test]
    fn framed_prompts_embed_text_verbatim() {
        let text = "We lost our biggest donor.\nWhat now?  ";
        let answer = compose(AgentKind::AnswerSuggestion, None, text);
        assert!(answer.user.contains(text));

        let reply = compose(AgentKind::ReplySuggestion, None, text);
        assert!(reply.user.contains(text));
        assert!(reply.user.contains("Message: "));
        assert_ne!(answer.system, reply.system);
    }

    #[test]
    fn compose_is_deterministic() {
        let profile = full_profile();
        assert_eq!(
            compose(AgentKind::Strategy, Some(&profile), "q"),
            compose(AgentKind::Strategy, Some(&profile), "q"),
        );
    }
}
