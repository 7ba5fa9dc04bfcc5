//! Portfolio analysis: balance score, readiness level, gaps, recommendations.
//!
//! Two interchangeable strategies implement [`Analyzer`]:
//! - [`StaticAnalyzer`]: the deterministic heuristic in [`engine`]
//! - [`RemoteAnalyzer`]: asks the remote generation service, degrading to a
//!   fixed result on any failure
//!
//! Neither strategy ever returns an error to its caller.

pub mod engine;
pub mod remote;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;

use crate::store::Initiative;

pub use engine::{analyze, TierDistribution, MIN_INITIATIVES};
pub use remote::{parse_analysis_response, AnalysisError, RemoteAnalyzer};

// =============================================================================
// Readiness level
// =============================================================================

/// Qualitative label attached to a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReadinessLevel {
    #[serde(rename = "Getting Started")]
    GettingStarted,
    #[serde(rename = "Surface Swimmer")]
    SurfaceSwimmer,
    #[serde(rename = "Deep Diver")]
    DeepDiver,
    #[serde(rename = "System Changer")]
    SystemChanger,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ReadinessLevel {
    pub const ALL: [ReadinessLevel; 5] = [
        ReadinessLevel::GettingStarted,
        ReadinessLevel::SurfaceSwimmer,
        ReadinessLevel::DeepDiver,
        ReadinessLevel::SystemChanger,
        ReadinessLevel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadinessLevel::GettingStarted => "Getting Started",
            ReadinessLevel::SurfaceSwimmer => "Surface Swimmer",
            ReadinessLevel::DeepDiver => "Deep Diver",
            ReadinessLevel::SystemChanger => "System Changer",
            ReadinessLevel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ReadinessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown readiness level: {0:?}")]
pub struct UnknownLevel(pub String);

impl FromStr for ReadinessLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLevel(wanted.to_string()))
    }
}

// =============================================================================
// Result
// =============================================================================

/// Maximum number of recommendations in any result.
pub const MAX_RECOMMENDATIONS: usize = 3;

pub const GETTING_STARTED_NARRATIVE: &str = "You need at least 3 initiatives to generate a meaningful analysis. Keep mapping your work across the six conditions!";

pub const GETTING_STARTED_RECOMMENDATIONS: [&str; 3] = [
    "Add more initiatives across different conditions",
    "Focus on balancing explicit and implicit work",
    "Consider power dynamics and mental models",
];

pub const DEGRADED_NARRATIVE: &str =
    "Sorry, we couldn't analyze your map right now. Please try again in a moment.";

pub const DEGRADED_RECOMMENDATION: &str =
    "Add more initiatives across the six conditions and run the analysis again";

/// Outcome of one analysis request. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    score: u8,
    level: ReadinessLevel,
    #[serde(rename = "gapAnalysis")]
    gap_analysis: String,
    recommendations: Vec<String>,
}

impl AnalysisResult {
    /// Build a result; the score is capped at 100 and recommendations at 3.
    pub fn new(
        score: u8,
        level: ReadinessLevel,
        gap_analysis: impl Into<String>,
        mut recommendations: Vec<String>,
    ) -> Self {
        recommendations.truncate(MAX_RECOMMENDATIONS);
        Self {
            score: score.min(100),
            level,
            gap_analysis: gap_analysis.into(),
            recommendations,
        }
    }

    /// Placeholder for portfolios under the minimum size.
    pub fn getting_started() -> Self {
        Self::new(
            0,
            ReadinessLevel::GettingStarted,
            GETTING_STARTED_NARRATIVE,
            GETTING_STARTED_RECOMMENDATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }

    /// Substitute used when the remote strategy fails.
    pub fn degraded() -> Self {
        Self::new(
            0,
            ReadinessLevel::Unknown,
            DEGRADED_NARRATIVE,
            vec![DEGRADED_RECOMMENDATION.to_string()],
        )
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    pub fn level(&self) -> ReadinessLevel {
        self.level
    }

    pub fn gap_analysis(&self) -> &str {
        &self.gap_analysis
    }

    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }
}

// =============================================================================
// Strategy seam
// =============================================================================

#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Analyze a snapshot. Always yields a structurally valid result.
    async fn analyze(&self, initiatives: &[Initiative]) -> AnalysisResult;

    /// Short strategy name for logs.
    fn name(&self) -> &'static str;
}

/// The deterministic, offline strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticAnalyzer;

#[async_trait]
impl Analyzer for StaticAnalyzer {
    async fn analyze(&self, initiatives: &[Initiative]) -> AnalysisResult {
        engine::analyze(initiatives)
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
