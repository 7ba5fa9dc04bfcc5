//! Example initiatives offered per condition.
//!
//! Suggestions are candidates only. Nothing lands in the store until the caller
//! accepts each one (see [`accept_suggestions`]).

pub mod remote;

use async_trait::async_trait;

use crate::conditions::ConditionKey;
use crate::store::{Initiative, InitiativeStore, Origin};

pub use remote::{parse_suggestions_response, RemoteSuggestions, SuggestionError};

/// Maximum number of candidates returned by any provider.
pub const MAX_SUGGESTIONS: usize = 3;

/// Returned when the remote strategy cannot produce usable candidates.
pub const FALLBACK_SUGGESTIONS: [&str; 3] = [
    "Add your own initiatives",
    "Map an existing program to this condition",
    "Ask partners which work fits this condition",
];

#[async_trait]
pub trait SuggestionProvider: Send + Sync {
    /// Up to [`MAX_SUGGESTIONS`] candidate texts. Never fails.
    async fn suggest(&self, condition: ConditionKey) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Pre-authored candidates for each condition.
pub fn static_suggestions(condition: ConditionKey) -> [&'static str; 3] {
    match condition {
        ConditionKey::Policies => [
            "Gender equity legislation advocacy",
            "Equal pay policy development",
            "Women's health policy initiatives",
        ],
        ConditionKey::Practices => [
            "Leadership development programs",
            "Grantmaking to women-led organizations",
            "Community partnership practices",
        ],
        ConditionKey::ResourceFlows => [
            "Funding for women entrepreneurs",
            "Resource allocation for underserved communities",
            "Investment in women's education",
        ],
        ConditionKey::Relationships => [
            "Coalition building across sectors",
            "Community stakeholder engagement",
            "Partnership with women's organizations",
        ],
        ConditionKey::PowerDynamics => [
            "Advocacy for women in leadership",
            "Power-sharing governance models",
            "Community organizing for systemic change",
        ],
        ConditionKey::MentalModels => [
            "Challenging gender stereotypes",
            "Cultural narrative change campaigns",
            "Shifting mindsets on women's roles",
        ],
    }
}

pub(crate) fn fallback_suggestions() -> Vec<String> {
    FALLBACK_SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

/// Deterministic table lookup. Always returns three candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticSuggestions;

#[async_trait]
impl SuggestionProvider for StaticSuggestions {
    async fn suggest(&self, condition: ConditionKey) -> Vec<String> {
        static_suggestions(condition)
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Add each accepted candidate as its own suggested initiative.
///
/// Blank candidates are skipped, as they would be for typed input.
pub fn accept_suggestions<I, S>(
    store: &mut InitiativeStore,
    condition: ConditionKey,
    accepted: I,
) -> Vec<Initiative>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    accepted
        .into_iter()
        .filter_map(|text| store.add(condition, text.as_ref(), Origin::Suggested))
        .collect()
}
