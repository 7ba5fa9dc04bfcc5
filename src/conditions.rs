//! Registry of the six conditions of systems change.
//!
//! The registry is static configuration: six conditions, each pinned to one of
//! three abstraction tiers. Nothing here is mutable at runtime.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown condition key: {0:?}")]
    NotFound(String),
}

// =============================================================================
// Tiers
// =============================================================================

/// Abstraction level a condition belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Explicit")]
    Explicit,
    #[serde(rename = "Semi-Explicit")]
    SemiExplicit,
    #[serde(rename = "Implicit")]
    Implicit,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Explicit, Tier::SemiExplicit, Tier::Implicit];

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Explicit => "Explicit",
            Tier::SemiExplicit => "Semi-Explicit",
            Tier::Implicit => "Implicit",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tier::Explicit => "Structural Change (Explicit)",
            Tier::SemiExplicit => "Relational Change (Semi-Explicit)",
            Tier::Implicit => "Transformative Change (Implicit)",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Tier::Explicit => {
                "Tangible, visible changes. Necessary but often not sufficient for long-term impact."
            }
            Tier::SemiExplicit => {
                "Shifting how people relate and share power. Bridges the gap between structure and mindset."
            }
            Tier::Implicit => {
                "The deepest level. Shifting the \"water\" we swim in: our fundamental beliefs."
            }
        }
    }

    /// Conditions in this tier, in registry order.
    pub fn conditions(&self) -> impl Iterator<Item = &'static Condition> + '_ {
        CONDITIONS.iter().filter(move |c| c.tier == *self)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Condition keys
// =============================================================================

/// Closed set of condition keys. The wire form is the short lowercase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConditionKey {
    #[serde(rename = "policies")]
    Policies,
    #[serde(rename = "practices")]
    Practices,
    #[serde(rename = "resources")]
    ResourceFlows,
    #[serde(rename = "relationships")]
    Relationships,
    #[serde(rename = "power")]
    PowerDynamics,
    #[serde(rename = "mental")]
    MentalModels,
}

impl ConditionKey {
    pub const ALL: [ConditionKey; 6] = [
        ConditionKey::Policies,
        ConditionKey::Practices,
        ConditionKey::ResourceFlows,
        ConditionKey::Relationships,
        ConditionKey::PowerDynamics,
        ConditionKey::MentalModels,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKey::Policies => "policies",
            ConditionKey::Practices => "practices",
            ConditionKey::ResourceFlows => "resources",
            ConditionKey::Relationships => "relationships",
            ConditionKey::PowerDynamics => "power",
            ConditionKey::MentalModels => "mental",
        }
    }

    pub fn condition(&self) -> &'static Condition {
        // CONDITIONS is laid out in ALL order.
        &CONDITIONS[*self as usize]
    }

    pub fn tier(&self) -> Tier {
        self.condition().tier
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionKey {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "policies" => Ok(ConditionKey::Policies),
            "practices" => Ok(ConditionKey::Practices),
            "resources" | "resource_flows" => Ok(ConditionKey::ResourceFlows),
            "relationships" => Ok(ConditionKey::Relationships),
            "power" | "power_dynamics" => Ok(ConditionKey::PowerDynamics),
            "mental" | "mental_models" => Ok(ConditionKey::MentalModels),
            _ => Err(RegistryError::NotFound(s.to_string())),
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Static metadata for one condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Condition {
    pub key: ConditionKey,
    pub label: &'static str,
    pub description: &'static str,
    pub tier: Tier,
    /// Display color, `#RRGGBB`.
    pub color: &'static str,
}

pub const CONDITIONS: [Condition; 6] = [
    Condition {
        key: ConditionKey::Policies,
        label: "Policies",
        description:
            "Government, institutional and organizational rules, regulations, and priorities.",
        tier: Tier::Explicit,
        color: "#00838F",
    },
    Condition {
        key: ConditionKey::Practices,
        label: "Practices",
        description: "Espoused activities of institutions, coalitions, and networks.",
        tier: Tier::Explicit,
        color: "#00796B",
    },
    Condition {
        key: ConditionKey::ResourceFlows,
        label: "Resource Flows",
        description: "How money, people, knowledge, and information are allocated.",
        tier: Tier::Explicit,
        color: "#004D40",
    },
    Condition {
        key: ConditionKey::Relationships,
        label: "Relationships",
        description: "Quality of connections and communication occurring among actors.",
        tier: Tier::SemiExplicit,
        color: "#673AB7",
    },
    Condition {
        key: ConditionKey::PowerDynamics,
        label: "Power Dynamics",
        description: "The distribution of decision-making power, authority, and influence.",
        tier: Tier::SemiExplicit,
        color: "#512DA8",
    },
    Condition {
        key: ConditionKey::MentalModels,
        label: "Mental Models",
        description: "Habits of thought, deeply held beliefs, and assumptions.",
        tier: Tier::Implicit,
        color: "#311B92",
    },
];

/// Look up a condition by its string key.
pub fn condition_of(key: &str) -> Result<&'static Condition, RegistryError> {
    key.parse::<ConditionKey>().map(|k| k.condition())
}

/// Look up the tier of a condition by its string key.
pub fn tier_of(key: &str) -> Result<Tier, RegistryError> {
    condition_of(key).map(|c| c.tier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_order_matches_key_order() {
        for key in ConditionKey::ALL {
            assert_eq!(key.condition().key, key);
        }
    }

    #[test]
    fn every_condition_has_exactly_one_tier() {
        let total: usize = Tier::ALL.iter().map(|t| t.conditions().count()).sum();
        assert_eq!(total, CONDITIONS.len());
        assert_eq!(Tier::Explicit.conditions().count(), 3);
        assert_eq!(Tier::SemiExplicit.conditions().count(), 2);
        assert_eq!(Tier::Implicit.conditions().count(), 1);
    }

    #[test]
    fn lookup_accepts_short_and_long_keys() {
        assert_eq!(tier_of("policies").unwrap(), Tier::Explicit);
        assert_eq!(tier_of("POWER_DYNAMICS").unwrap(), Tier::SemiExplicit);
        assert_eq!(condition_of("Mental").unwrap().label, "Mental Models");
        assert_eq!(
            condition_of("resource_flows").unwrap().key,
            ConditionKey::ResourceFlows
        );
    }

    #[test]
    fn unknown_key_is_not_found() {
        let err = condition_of("culture").unwrap_err();
        assert_eq!(err, RegistryError::NotFound("culture".to_string()));
        assert!(tier_of("").is_err());
    }

    #[test]
    fn key_serializes_to_short_form() {
        let json = serde_json::to_string(&ConditionKey::MentalModels).unwrap();
        assert_eq!(json, "\"mental\"");
        let back: ConditionKey = serde_json::from_str("\"resources\"").unwrap();
        assert_eq!(back, ConditionKey::ResourceFlows);
        assert!(serde_json::from_str::<ConditionKey>("\"culture\"").is_err());
    }
}
