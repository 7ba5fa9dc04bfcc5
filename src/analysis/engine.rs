//! Deterministic balance heuristic.
//!
//! The score rewards the weakest tier: `round(30 + 2 * min(tier percentages))`.
//! With six conditions spread 3/2/1 over the tiers the minimum percentage
//! cannot exceed 33.3, so real portfolios top out at 97. The thresholds below
//! are hand-tuned constants and are kept as-is.

use serde::Serialize;

use crate::conditions::Tier;
use crate::store::Initiative;

use super::{AnalysisResult, ReadinessLevel};

/// Portfolios smaller than this get the "Getting Started" placeholder.
pub const MIN_INITIATIVES: usize = 3;

const SCORE_FLOOR: f64 = 30.0;
const BALANCE_WEIGHT: f64 = 2.0;

// Level thresholds (percent).
const CHANGER_IMPLICIT_PCT: f64 = 20.0;
const CHANGER_SEMI_PCT: f64 = 20.0;
const DIVER_SEMI_PCT: f64 = 15.0;
const DIVER_IMPLICIT_PCT: f64 = 10.0;

// Gap thresholds (percent).
const GAP_EXPLICIT_PCT: f64 = 30.0;
const GAP_SEMI_PCT: f64 = 25.0;
const GAP_IMPLICIT_PCT: f64 = 15.0;

// Recommendation thresholds (raw counts).
const REC_MIN_IMPLICIT: usize = 2;
const REC_MIN_SEMI: usize = 2;
const REC_MIN_EXPLICIT: usize = 3;

const GAP_EXPLICIT: &str = "structural policies and practices";
const GAP_SEMI: &str = "relationships and power dynamics";
const GAP_IMPLICIT: &str = "mental models and cultural narratives";

const REC_IMPLICIT: &str =
    "Add initiatives focused on shifting mental models and cultural narratives";
const REC_SEMI: &str = "Invest in relationship building and addressing power dynamics";
const REC_EXPLICIT: &str =
    "Strengthen structural work through policies, practices, and resource allocation";
const REC_CONTINUE: [&str; 3] = [
    "Continue balanced work across all six conditions",
    "Document and share your systems change approach",
    "Build on existing strengths while maintaining balance",
];

/// Per-tier counts and percentages of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TierDistribution {
    pub explicit: usize,
    pub semi_explicit: usize,
    pub implicit: usize,
    pub explicit_pct: f64,
    pub semi_explicit_pct: f64,
    pub implicit_pct: f64,
}

impl TierDistribution {
    pub fn from_initiatives(initiatives: &[Initiative]) -> Self {
        let (mut explicit, mut semi_explicit, mut implicit) = (0usize, 0usize, 0usize);
        for item in initiatives {
            match item.condition.tier() {
                Tier::Explicit => explicit += 1,
                Tier::SemiExplicit => semi_explicit += 1,
                Tier::Implicit => implicit += 1,
            }
        }

        let total = explicit + semi_explicit + implicit;
        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                (n as f64 / total as f64) * 100.0
            }
        };

        Self {
            explicit,
            semi_explicit,
            implicit,
            explicit_pct: pct(explicit),
            semi_explicit_pct: pct(semi_explicit),
            implicit_pct: pct(implicit),
        }
    }

    pub fn total(&self) -> usize {
        self.explicit + self.semi_explicit + self.implicit
    }

    pub fn count(&self, tier: Tier) -> usize {
        match tier {
            Tier::Explicit => self.explicit,
            Tier::SemiExplicit => self.semi_explicit,
            Tier::Implicit => self.implicit,
        }
    }

    pub fn pct(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Explicit => self.explicit_pct,
            Tier::SemiExplicit => self.semi_explicit_pct,
            Tier::Implicit => self.implicit_pct,
        }
    }

    /// Smallest of the three tier percentages.
    pub fn balance(&self) -> f64 {
        self.explicit_pct
            .min(self.semi_explicit_pct)
            .min(self.implicit_pct)
    }

    pub fn score(&self) -> u8 {
        (SCORE_FLOOR + self.balance() * BALANCE_WEIGHT).round() as u8
    }

    /// First matching rule wins.
    pub fn level(&self) -> ReadinessLevel {
        if self.implicit_pct > CHANGER_IMPLICIT_PCT && self.semi_explicit_pct > CHANGER_SEMI_PCT {
            ReadinessLevel::SystemChanger
        } else if self.semi_explicit_pct > DIVER_SEMI_PCT || self.implicit_pct > DIVER_IMPLICIT_PCT
        {
            ReadinessLevel::DeepDiver
        } else {
            ReadinessLevel::SurfaceSwimmer
        }
    }

    /// Gap phrases in explicit, semi-explicit, implicit order.
    pub fn gaps(&self) -> Vec<&'static str> {
        let mut gaps = Vec::new();
        if self.explicit_pct < GAP_EXPLICIT_PCT {
            gaps.push(GAP_EXPLICIT);
        }
        if self.semi_explicit_pct < GAP_SEMI_PCT {
            gaps.push(GAP_SEMI);
        }
        if self.implicit_pct < GAP_IMPLICIT_PCT {
            gaps.push(GAP_IMPLICIT);
        }
        gaps
    }

    pub fn recommendations(&self) -> Vec<String> {
        let mut recs: Vec<String> = Vec::new();
        if self.implicit < REC_MIN_IMPLICIT {
            recs.push(REC_IMPLICIT.to_string());
        }
        if self.semi_explicit < REC_MIN_SEMI {
            recs.push(REC_SEMI.to_string());
        }
        if self.explicit < REC_MIN_EXPLICIT {
            recs.push(REC_EXPLICIT.to_string());
        }
        if recs.is_empty() {
            recs.extend(REC_CONTINUE.iter().map(|s| s.to_string()));
        }
        recs
    }
}

fn gap_narrative(total: usize, gaps: &[&str], level: ReadinessLevel) -> String {
    if gaps.is_empty() {
        return format!(
            "Excellent! Your {total} initiatives show strong balance across explicit, semi-explicit, and implicit conditions. This comprehensive approach positions you well for deep systems change."
        );
    }

    let closing = if level == ReadinessLevel::SystemChanger {
        "You're doing excellent work across all three levels!"
    } else {
        "Focus on balancing across all three levels for maximum impact."
    };
    format!(
        "Your portfolio shows {total} initiatives. To achieve deeper systems change, consider strengthening work in: {}. {closing}",
        gaps.join(", ")
    )
}

/// Analyze a snapshot with the static heuristic. Pure and deterministic.
pub fn analyze(initiatives: &[Initiative]) -> AnalysisResult {
    if initiatives.len() < MIN_INITIATIVES {
        return AnalysisResult::getting_started();
    }

    let dist = TierDistribution::from_initiatives(initiatives);
    let level = dist.level();
    let narrative = gap_narrative(dist.total(), &dist.gaps(), level);

    AnalysisResult::new(dist.score(), level, narrative, dist.recommendations())
}
