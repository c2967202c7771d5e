use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The philosophical lens a reason was generated through.
///
/// The remote model is asked to pick one of the six named lenses, but its
/// answer is not trusted: anything else is kept verbatim in [`Framework::Other`]
/// so it survives a save/load cycle and renders with a fallback label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Framework {
    HumanNeeds,
    JungianLibido,
    QuantumEconomics,
    Relativity,
    CosmicIdentity,
    TaoistReincarnation,
    Other(String),
}

impl Framework {
    /// The six lenses the generator is constrained to, in prompt order.
    pub const KNOWN: [Framework; 6] = [
        Framework::HumanNeeds,
        Framework::JungianLibido,
        Framework::QuantumEconomics,
        Framework::Relativity,
        Framework::CosmicIdentity,
        Framework::TaoistReincarnation,
    ];

    /// Wire name, as used in the response schema and the stored document.
    pub fn as_str(&self) -> &str {
        match self {
            Self::HumanNeeds => "human_needs",
            Self::JungianLibido => "jungian_libido",
            Self::QuantumEconomics => "quantum_economics",
            Self::Relativity => "relativity",
            Self::CosmicIdentity => "cosmic_identity",
            Self::TaoistReincarnation => "taoist_reincarnation",
            Self::Other(s) => s,
        }
    }

    /// Short badge label shown next to each reason.
    pub fn label(&self) -> &'static str {
        match self {
            Self::HumanNeeds => "6 Human Needs",
            Self::JungianLibido => "Jungian Drive",
            Self::QuantumEconomics => "Quantum Econ",
            Self::Relativity => "Relativity",
            Self::CosmicIdentity => "God Mode",
            Self::TaoistReincarnation => "10 Lifetimes",
            Self::Other(_) => "Reason",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "human_needs" => Self::HumanNeeds,
            "jungian_libido" => Self::JungianLibido,
            "quantum_economics" => Self::QuantumEconomics,
            "relativity" => Self::Relativity,
            "cosmic_identity" => Self::CosmicIdentity,
            "taoist_reincarnation" => Self::TaoistReincarnation,
            other => Self::Other(other.to_owned()),
        })
    }
}

impl From<String> for Framework {
    fn from(s: String) -> Self {
        match s.parse::<Framework>() {
            Ok(Self::Other(_)) => Self::Other(s),
            Ok(known) => known,
            Err(never) => match never {},
        }
    }
}

impl From<Framework> for String {
    fn from(f: Framework) -> Self {
        match f {
            Framework::Other(s) => s,
            known => known.as_str().to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// A single motivational statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReasonItem {
    pub id: String,
    pub description: String,
    pub framework: Framework,
    /// Always true for generated reasons; kept so older documents still load.
    #[serde(default = "default_true")]
    pub is_brainstormed: bool,
}

/// A life-domain grouping: one outcome, one purpose, many reasons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmCategory {
    pub id: String,
    pub name: String,
    /// The result the user wants.
    pub outcome: String,
    /// Why it matters.
    pub purpose: String,
    pub reasons: Vec<ReasonItem>,
}

/// A generated matrix. Never edited after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpmPlan {
    pub categories: Vec<RpmCategory>,
    /// Ids of the reasons flagged for daily review. Ids that do not resolve
    /// are skipped when the panel is built.
    pub daily_top5_ids: Vec<String>,
}

impl RpmPlan {
    /// Iterate over every reason in category order, paired with its category.
    pub fn reasons(&self) -> impl Iterator<Item = (&RpmCategory, &ReasonItem)> {
        self.categories
            .iter()
            .flat_map(|cat| cat.reasons.iter().map(move |r| (cat, r)))
    }

    /// Look up a reason by id anywhere in the plan.
    pub fn find_reason(&self, id: &str) -> Option<(&RpmCategory, &ReasonItem)> {
        self.reasons().find(|(_, r)| r.id == id)
    }

    pub fn reason_count(&self) -> usize {
        self.categories.iter().map(|c| c.reasons.len()).sum()
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Done/not-done flags keyed by reason id.
///
/// Held apart from [`RpmPlan`] so a new plan can start from a clean slate.
/// Ids left over from a previous plan are harmless: nothing looks them up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionState(BTreeMap<String, bool>);

impl CompletionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the flag for `id`. An id seen for the first time becomes `true`.
    /// Returns the new value.
    pub fn toggle(&mut self, id: &str) -> bool {
        let slot = self.0.entry(id.to_owned()).or_insert(false);
        *slot = !*slot;
        *slot
    }

    pub fn is_done(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, bool)> for CompletionState {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// The persisted pair. Plan and completion are always written together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub plan: RpmPlan,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub completion_status: CompletionState,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<CompletionState, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<CompletionState>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
