//! Analysis backed by the remote generation service.
//!
//! Implements the contract between the model's JSON answer and
//! [`AnalysisResult`]. Transport and parse failures are logged and replaced
//! by [`AnalysisResult::degraded`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::extract::parse_json_object;
use crate::gateway::{Attribution, ChatGateway, ChatModel, ChatRequest, ProviderError};
use crate::prompts::render_analysis_prompt;
use crate::store::Initiative;

use super::engine::MIN_INITIATIVES;
use super::{AnalysisResult, Analyzer, ReadinessLevel, UnknownLevel};

const ANALYSIS_MAX_OUTPUT_TOKENS: u32 = 1_024;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("parse error: {0}")]
    Parse(String),
}

impl AnalysisError {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::Provider(e) => e.code(),
            AnalysisError::Parse(_) => "parse_error",
        }
    }
}

/// Raw JSON from the model. Every field is required.
#[derive(Debug, Deserialize)]
struct AnalysisJson {
    score: f64,
    level: String,
    #[serde(rename = "gapAnalysis")]
    gap_analysis: String,
    recommendations: Vec<String>,
}

/// Parse a model response into a result, validating ranges and labels.
pub fn parse_analysis_response(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let parsed: AnalysisJson =
        parse_json_object(raw).map_err(|e| AnalysisError::Parse(e.to_string()))?;

    if !parsed.score.is_finite() || !(0.0..=100.0).contains(&parsed.score) {
        return Err(AnalysisError::Parse(format!(
            "score out of range [0,100]: {}",
            parsed.score
        )));
    }
    let level: ReadinessLevel = parsed
        .level
        .parse()
        .map_err(|e: UnknownLevel| AnalysisError::Parse(e.to_string()))?;

    let gap_analysis = parsed.gap_analysis.trim();
    if gap_analysis.is_empty() {
        return Err(AnalysisError::Parse("empty 'gapAnalysis'".into()));
    }

    let recommendations = parsed
        .recommendations
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .collect();

    Ok(AnalysisResult::new(
        parsed.score.round() as u8,
        level,
        gap_analysis,
        recommendations,
    ))
}

/// Analyzer that delegates judgement to a chat model.
pub struct RemoteAnalyzer {
    gateway: Arc<dyn ChatGateway>,
    model: String,
    attribution: Attribution,
}

impl RemoteAnalyzer {
    pub fn new(gateway: Arc<dyn ChatGateway>, model: impl Into<String>) -> Self {
        Self {
            gateway,
            model: model.into(),
            attribution: Attribution::new("analysis::remote"),
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

    /// Fallible core, kept separate so the boundary can log one place.
    pub async fn try_analyze(
        &self,
        initiatives: &[Initiative],
    ) -> Result<AnalysisResult, AnalysisError> {
        let prompt = render_analysis_prompt(initiatives);
        let request = ChatRequest::new(
            ChatModel::openrouter(&self.model),
            prompt.to_messages(),
            self.attribution.clone(),
        )
        .temperature(0.2)
        .max_tokens(ANALYSIS_MAX_OUTPUT_TOKENS)
        .json();

        let response = self.gateway.chat(request).await?;
        debug!(
            template = prompt.template_slug,
            chars = response.content.len(),
            "received analysis response"
        );
        parse_analysis_response(&response.content)
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    async fn analyze(&self, initiatives: &[Initiative]) -> AnalysisResult {
        if initiatives.len() < MIN_INITIATIVES {
            return AnalysisResult::getting_started();
        }

        match self.try_analyze(initiatives).await {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    code = err.code(),
                    error = %err,
                    model = %self.model,
                    "remote analysis failed; returning degraded result"
                );
                AnalysisResult::degraded()
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
    fn parses_valid_response() {
        let raw = r#"{"score": 71.6, "level": "Deep Diver", "gapAnalysis": "Needs more implicit work.", "recommendations": ["A", " ", "B", "C", "D"]}"#;
        let result = parse_analysis_response(raw).unwrap();
        assert_eq!(result.score(), 72);
        assert_eq!(result.level(), ReadinessLevel::DeepDiver);
        assert_eq!(result.recommendations(), ["A", "B", "C"]);
    }

    #[test]
    fn parses_response_wrapped_in_prose() {
        let raw = "Here is the analysis:\n```json\n{\"score\": 40, \"level\": \"surface swimmer\", \"gapAnalysis\": \"Thin on {relationships}.\", \"recommendations\": []}\n```";
        let result = parse_analysis_response(raw).unwrap();
        assert_eq!(result.level(), ReadinessLevel::SurfaceSwimmer);
        assert!(result.recommendations().is_empty());
        assert_eq!(result.gap_analysis(), "Thin on {relationships}.");
    }

    #[test]
    fn skips_braces_in_leading_prose() {
        let raw = "Analysis of {your map}:\n{\"score\": 60, \"level\": \"Deep Diver\", \"gapAnalysis\": \"Light on mental models.\", \"recommendations\": [\"Run narrative labs\"]}";
        let result = parse_analysis_response(raw).unwrap();
        assert_eq!(result.score(), 60);
        assert_eq!(result.level(), ReadinessLevel::DeepDiver);
        assert_eq!(result.recommendations(), ["Run narrative labs"]);
    }

    #[test]
    fn rejects_missing_field() {
        let raw = r#"{"score": 50, "level": "Deep Diver", "recommendations": []}"#;
        assert!(matches!(
            parse_analysis_response(raw),
            Err(AnalysisError::Parse(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_score_and_unknown_level() {
        let raw = r#"{"score": 140, "level": "Deep Diver", "gapAnalysis": "x", "recommendations": []}"#;
        assert!(parse_analysis_response(raw).is_err());
        let raw = r#"{"score": 40, "level": "Wizard", "gapAnalysis": "x", "recommendations": []}"#;
        match parse_analysis_response(raw) {
            Err(AnalysisError::Parse(msg)) => assert!(msg.contains("unknown readiness level")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_json() {
        assert!(parse_analysis_response("I think it's fine").is_err());
    }
}
