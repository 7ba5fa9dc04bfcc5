//! Report data for one analysis run: result, per-condition chart data and
//! per-tier summary.

use serde::Serialize;

use crate::analysis::{AnalysisResult, TierDistribution};
use crate::conditions::{ConditionKey, Tier, CONDITIONS};
use crate::store::Initiative;

#[derive(Debug, Clone, Serialize)]
pub struct SystemsReport {
    /// blake3 of the analyzed snapshot, for matching a report to its input.
    pub snapshot_hash: String,
    pub total: usize,
    pub result: AnalysisResult,
    pub conditions: Vec<ConditionCount>,
    pub tiers: Vec<TierSummary>,
}

/// One bar of the effort distribution chart.
#[derive(Debug, Clone, Serialize)]
pub struct ConditionCount {
    pub key: ConditionKey,
    pub label: &'static str,
    pub tier: Tier,
    pub color: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TierSummary {
    pub tier: Tier,
    pub title: &'static str,
    pub description: &'static str,
    pub count: usize,
    pub pct: f64,
}

pub fn build_report(snapshot: &[Initiative], result: &AnalysisResult) -> SystemsReport {
    let conditions = CONDITIONS
        .iter()
        .map(|c| ConditionCount {
            key: c.key,
            label: c.label,
            tier: c.tier,
            color: c.color,
            count: snapshot.iter().filter(|i| i.condition == c.key).count(),
        })
        .collect();

    let dist = TierDistribution::from_initiatives(snapshot);
    let tiers = Tier::ALL
        .iter()
        .map(|t| TierSummary {
            tier: *t,
            title: t.title(),
            description: t.description(),
            count: dist.count(*t),
            pct: dist.pct(*t),
        })
        .collect();

    SystemsReport {
        snapshot_hash: hash_snapshot(snapshot),
        total: snapshot.len(),
        result: result.clone(),
        conditions,
        tiers,
    }
}

pub fn render_report_markdown(report: &SystemsReport) -> String {
    let result = &report.result;
    let mut out = String::new();
    out.push_str("# Systems Change Report\n\n");
    out.push_str(&format!("- Readiness level: {}\n", result.level()));
    out.push_str(&format!("- Score: {} / 100\n", result.score()));
    out.push_str(&format!("- Initiatives: {}\n", report.total));
    let short_hash = report
        .snapshot_hash
        .get(..12)
        .unwrap_or(&report.snapshot_hash);
    out.push_str(&format!("- Snapshot: `{short_hash}`\n"));

    out.push_str("\n## Gap Analysis\n\n");
    out.push_str(result.gap_analysis());
    out.push('\n');

    out.push_str("\n## Effort Distribution\n\n");
    for tier in &report.tiers {
        out.push_str(&format!(
            "### {} ({} initiatives, {:.1}%)\n\n",
            tier.title, tier.count, tier.pct
        ));
        for c in report.conditions.iter().filter(|c| c.tier == tier.tier) {
            out.push_str(&format!("- {}: {}\n", c.label, c.count));
        }
        out.push('\n');
    }

    out.push_str("## Strategic Recommendations\n\n");
    if result.recommendations().is_empty() {
        out.push_str("_None._\n");
    }
    for (idx, rec) in result.recommendations().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", idx + 1, rec));
    }

    out
}

fn hash_snapshot(snapshot: &[Initiative]) -> String {
    let bytes = serde_json::to_vec(snapshot).unwrap_or_default();
    blake3::hash(&bytes).to_hex().to_string()
}
