//! Prompt templates for the remote generation strategies.
//!
//! Provider-agnostic: templates render to plain [`Message`]s.

use crate::conditions::Condition;
use crate::gateway::Message;
use crate::store::Initiative;

/// Rendered prompt ready for the gateway.
#[derive(Debug, Clone)]
pub struct PromptInstance {
    pub template_slug: &'static str,
    pub system: String,
    pub user: String,
}

impl PromptInstance {
    pub fn to_messages(&self) -> Vec<Message> {
        vec![Message::system(&self.system), Message::user(&self.user)]
    }
}

/// Escape XML special characters so user text cannot close our tags.
fn escape_xml_chars(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub slug: &'static str,
    pub system: &'static str,
    pub user: &'static str,
}

impl PromptTemplate {
    /// Substitute `{name}` placeholders. Values are XML-escaped.
    fn render_with(&self, vars: &[(&str, &str)]) -> PromptInstance {
        let mut system = self.system.to_string();
        let mut user = self.user.to_string();
        for (name, value) in vars {
            let placeholder = format!("{{{name}}}");
            let safe = escape_xml_chars(value);
            system = system.replace(&placeholder, &safe);
            user = user.replace(&placeholder, &safe);
        }
        PromptInstance {
            template_slug: self.slug,
            system: system.trim().to_string(),
            user: user.trim().to_string(),
        }
    }
}

// =============================================================================
// Suggestions
// =============================================================================

/// Upper bound on words per suggested initiative.
pub const SUGGESTION_MAX_WORDS: usize = 15;

pub const SUGGESTIONS_V1: PromptTemplate = PromptTemplate {
    slug: "suggestions_v1",
    system: r#"You help a foundation map its work against the Six Conditions of Systems Change framework. You propose concrete, realistic initiatives an organization could run.

Output only a JSON array of exactly 3 strings. Each string is one initiative of fewer than 15 words.
Example:
["Coalition building across sectors", "Community stakeholder listening sessions", "Joint advocacy with partner organizations"]"#,
    user: r#"Suggest initiatives for this condition.
<condition_label>{condition_label}</condition_label>
<condition_description>{condition_description}</condition_description>

json:"#,
};

pub fn render_suggestions_prompt(condition: &Condition) -> PromptInstance {
    SUGGESTIONS_V1.render_with(&[
        ("condition_label", condition.label),
        ("condition_description", condition.description),
    ])
}

// =============================================================================
// Analysis
// =============================================================================

pub const ANALYSIS_V1: PromptTemplate = PromptTemplate {
    slug: "analysis_v1",
    system: r#"You are a systems change advisor. You review an organization's portfolio of initiatives, each tagged with one of three tiers of the Six Conditions of Systems Change: Explicit (policies, practices, resource flows), Semi-Explicit (relationships, power dynamics) and Implicit (mental models).

Judge how balanced the portfolio is across the tiers. Output only a JSON object with:
- score: number from 0 to 100
- level: one of "Surface Swimmer", "Deep Diver", "System Changer"
- gapAnalysis: a short paragraph naming the weakest tiers
- recommendations: array of at most 3 short strings
Example:
{"score": 64, "level": "Deep Diver", "gapAnalysis": "...", "recommendations": ["...", "..."]}"#,
    user: r#"<initiatives>
{initiatives}
</initiatives>

Return a JSON object with your analysis.
json:"#,
};

/// One `[tier label]: text` line per initiative.
pub fn initiative_listing(initiatives: &[Initiative]) -> String {
    initiatives
        .iter()
        .map(|i| format!("[{}]: {}", i.condition.tier().label(), i.text))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_analysis_prompt(initiatives: &[Initiative]) -> PromptInstance {
    let listing = initiative_listing(initiatives);
    ANALYSIS_V1.render_with(&[("initiatives", listing.as_str())])
}
