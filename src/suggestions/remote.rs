//! Suggestions generated by the remote generation service.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::conditions::ConditionKey;
use crate::extract::{parse_json_array, parse_json_object};
use crate::gateway::{Attribution, ChatGateway, ChatModel, ChatRequest, ProviderError};
use crate::prompts::{render_suggestions_prompt, SUGGESTION_MAX_WORDS};

use super::{fallback_suggestions, SuggestionProvider, MAX_SUGGESTIONS};

const SUGGESTIONS_MAX_OUTPUT_TOKENS: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum SuggestionError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("response contained no usable suggestions")]
    Empty,
}

impl SuggestionError {
    pub fn code(&self) -> &'static str {
        match self {
            SuggestionError::Provider(e) => e.code(),
            SuggestionError::Parse(_) => "parse_error",
            SuggestionError::Empty => "empty",
        }
    }
}

/// Parse a model response into at most three candidate strings.
///
/// Accepts a bare JSON array of strings, or an object wrapping one (some
/// models refuse to emit a top-level array). Blank and overlong entries are
/// dropped.
pub fn parse_suggestions_response(raw: &str) -> Result<Vec<String>, SuggestionError> {
    let items = match parse_json_object::<SuggestionsEnvelope>(raw) {
        Ok(envelope) => envelope.suggestions,
        Err(_) => match parse_json_array::<Vec<String>>(raw) {
            Ok(items) => items,
            Err(array_err) => first_array_in_object(raw).map_err(|object_err| {
                SuggestionError::Parse(format!(
                    "no array of strings ({array_err}) and no wrapping object ({object_err})"
                ))
            })?,
        },
    };

    let mut out = Vec::with_capacity(MAX_SUGGESTIONS);
    for text in items {
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let words = text.split_whitespace().count();
        if words > SUGGESTION_MAX_WORDS {
            debug!(words, "dropping overlong suggestion");
            continue;
        }
        out.push(text.to_string());
        if out.len() == MAX_SUGGESTIONS {
            break;
        }
    }

    if out.is_empty() {
        return Err(SuggestionError::Empty);
    }
    Ok(out)
}

#[derive(Deserialize)]
struct SuggestionsEnvelope {
    suggestions: Vec<String>,
}

/// First array value of a wrapping object under some other key.
fn first_array_in_object(raw: &str) -> Result<Vec<String>, String> {
    let map: Map<String, Value> = parse_json_object(raw).map_err(|e| e.to_string())?;
    let array = map
        .into_iter()
        .map(|(_, v)| v)
        .find(Value::is_array)
        .ok_or_else(|| "no array found in JSON object".to_string())?;
    serde_json::from_value(array).map_err(|e| e.to_string())
}

/// Suggestion provider that asks a chat model for candidates.
pub struct RemoteSuggestions {
    gateway: Arc<dyn ChatGateway>,
    model: String,
    attribution: Attribution,
}

impl RemoteSuggestions {
    pub fn new(gateway: Arc<dyn ChatGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            attribution: Attribution::new("suggestions::remote"),
        }
    }

    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = attribution;
        self
    }

    /// Tag every request with the mapping session it serves.
    pub fn with_session(mut self, session_id: Uuid) -> Self {
        self.attribution = self.attribution.with_session(session_id);
        self
    }

    pub async fn try_suggest(&self, condition: ConditionKey) -> Result<Vec<String>, SuggestionError> {
        let prompt = render_suggestions_prompt(condition.condition());
        let request = ChatRequest::new(
            ChatModel::openrouter(&self.model),
            prompt.to_messages(),
            self.attribution.clone(),
        )
        .temperature(0.7)
        .max_tokens(SUGGESTIONS_MAX_OUTPUT_TOKENS);

        let response = self.gateway.chat(request).await?;
        parse_suggestions_response(&response.content)
    }
}

#[async_trait]
impl SuggestionProvider for RemoteSuggestions {
    async fn suggest(&self, condition: ConditionKey) -> Vec<String> {
        match self.try_suggest(condition).await {
            Ok(suggestions) => suggestions,
            Err(err) => {
                warn!(
                    condition = %condition,
                    code = err.code(),
                    error = %err,
                    "remote suggestions failed; using fallback list"
                );
                fallback_suggestions()
            }
        }
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_array() {
        let got = parse_suggestions_response(r#"["A", "B", "C", "D"]"#).unwrap();
        assert_eq!(got, vec!["A", "B", "C"]);
    }

    #[test]
    fn parses_array_in_prose() {
        let raw = "Sure, here are some ideas:\n[\"Mentoring circles\", \"Board seats for [community] members\"]";
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got[1], "Board seats for [community] members");
    }

    #[test]
    fn parses_wrapped_object() {
        let raw = r#"{"suggestions": ["Narrative change fellowship", "Media partnerships"]}"#;
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got.len(), 2);
    }

    #[test]
    fn braces_in_prose_do_not_hide_the_array() {
        let raw = "Ideas for {Power Dynamics}:\n[\"Shared governance boards\", \"Rotating facilitation\"]";
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got, vec!["Shared governance boards", "Rotating facilitation"]);
    }

    #[test]
    fn brackets_in_prose_do_not_hide_the_object() {
        let raw = r#"Here [as requested]: {"suggestions": ["Mentoring circles"]}"#;
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got, vec!["Mentoring circles"]);
    }

    #[test]
    fn wrapped_object_prefers_suggestions_key() {
        let raw = r#"{"notes": ["skip me"], "suggestions": ["Peer exchanges"]}"#;
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got, vec!["Peer exchanges"]);
    }

    #[test]
    fn wrapped_object_under_other_key() {
        let raw = r#"{"ideas": ["Community budget assemblies"]}"#;
        let got = parse_suggestions_response(raw).unwrap();
        assert_eq!(got, vec!["Community budget assemblies"]);
    }

    #[test]
    fn drops_blank_and_overlong_entries() {
        let long = "word ".repeat(SUGGESTION_MAX_WORDS + 1);
        let raw = serde_json::to_string(&vec!["  ", long.as_str(), "Short idea"]).unwrap();
        let got = parse_suggestions_response(&raw).unwrap();
        assert_eq!(got, vec!["Short idea"]);
    }

    #[test]
    fn rejects_non_string_items_and_empty_arrays() {
        assert!(matches!(
            parse_suggestions_response(r#"[1, 2, 3]"#),
            Err(SuggestionError::Parse(_))
        ));
        assert!(matches!(
            parse_suggestions_response("[]"),
            Err(SuggestionError::Empty)
        ));
        assert!(parse_suggestions_response("no ideas today").is_err());
    }
}
