//! In-memory initiative store for one mapping session.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conditions::ConditionKey;

/// Opaque identity of a stored initiative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitiativeId(Uuid);

impl InitiativeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InitiativeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InitiativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where an initiative's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    #[default]
    User,
    Suggested,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("initiative text must not be blank")]
    BlankText,
}

/// One categorized activity on the map.
///
/// Deserializing applies the same rules as [`Initiative::new`]: text is
/// trimmed and blank text is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInitiative")]
pub struct Initiative {
    pub id: InitiativeId,
    pub condition: ConditionKey,
    pub text: String,
    pub origin: Origin,
}

#[derive(Deserialize)]
struct RawInitiative {
    id: InitiativeId,
    condition: ConditionKey,
    text: String,
    #[serde(default)]
    origin: Origin,
}

impl TryFrom<RawInitiative> for Initiative {
    type Error = StoreError;

    fn try_from(raw: RawInitiative) -> Result<Self, Self::Error> {
        let text = raw.text.trim();
        if text.is_empty() {
            return Err(StoreError::BlankText);
        }
        Ok(Self {
            id: raw.id,
            condition: raw.condition,
            text: text.to_string(),
            origin: raw.origin,
        })
    }
}

impl Initiative {
    /// Build an initiative with a fresh id. Returns `None` for blank text.
    pub fn new(condition: ConditionKey, text: &str, origin: Origin) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            id: InitiativeId::new(),
            condition,
            text: text.to_string(),
            origin,
        })
    }

    pub fn is_suggested(&self) -> bool {
        self.origin == Origin::Suggested
    }
}

/// Ordered, insertion-preserving collection of initiatives.
#[derive(Debug, Clone, Default)]
pub struct InitiativeStore {
    items: Vec<Initiative>,
}

impl InitiativeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an initiative. Blank text is ignored and yields `None`.
    pub fn add(&mut self, condition: ConditionKey, text: &str, origin: Origin) -> Option<Initiative> {
        let initiative = Initiative::new(condition, text, origin)?;
        self.items.push(initiative.clone());
        Some(initiative)
    }

    /// Remove by id. Returns whether anything was removed.
    pub fn remove(&mut self, id: InitiativeId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.id != id);
        self.items.len() != before
    }

    pub fn get(&self, id: InitiativeId) -> Option<&Initiative> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn list_by_category(&self, condition: ConditionKey) -> Vec<&Initiative> {
        self.items
            .iter()
            .filter(|i| i.condition == condition)
            .collect()
    }

    /// Owned copy of the current contents, in insertion order.
    pub fn snapshot(&self) -> Vec<Initiative> {
        self.items.clone()
    }

    pub fn as_slice(&self) -> &[Initiative] {
        &self.items
    }

    /// Count per condition. Every condition is present, zero included.
    pub fn counts_by_condition(&self) -> BTreeMap<ConditionKey, usize> {
        let mut counts: BTreeMap<ConditionKey, usize> =
            ConditionKey::ALL.iter().map(|k| (*k, 0)).collect();
        for item in &self.items {
            *counts.entry(item.condition).or_insert(0) += 1;
        }
        counts
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
