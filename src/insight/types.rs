use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The caller's payload: named fields whose shape depends on the feature.
pub type InsightRequest = Map<String, Value>;

/// Which portal feature is asking. Selects the prompt template, the
/// required field, and whether the answer is JSON or prose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightKind {
    SymptomAnalysis,
    HealthTrends,
    ClinicalDecision,
    CaseSummary,
    RadiologyReport,
}

/// How the upstream is asked to answer, and how its answer is normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseMode {
    Structured,
    Text,
}

impl InsightKind {
    pub fn all() -> &'static [InsightKind] {
        &[
            Self::SymptomAnalysis,
            Self::HealthTrends,
            Self::ClinicalDecision,
            Self::CaseSummary,
            Self::RadiologyReport,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SymptomAnalysis => "symptom-analysis",
            Self::HealthTrends => "health-trends",
            Self::ClinicalDecision => "clinical-decision",
            Self::CaseSummary => "case-summary",
            Self::RadiologyReport => "radiology-report",
        }
    }

    /// The free-text (or series) field that must be present.
    pub fn primary_field(&self) -> &'static str {
        match self {
            Self::SymptomAnalysis => "symptoms",
            Self::HealthTrends => "vitals",
            Self::ClinicalDecision => "caseDescription",
            Self::CaseSummary => "caseText",
            Self::RadiologyReport => "findings",
        }
    }

    pub fn mode(&self) -> ResponseMode {
        match self {
            Self::SymptomAnalysis | Self::HealthTrends | Self::ClinicalDecision => {
                ResponseMode::Structured
            }
            Self::CaseSummary | Self::RadiologyReport => ResponseMode::Text,
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown insight kind: {s}"))
    }
}

/// Normalized result of one insight call.
///
/// Serialized as `{"kind": "structured", "data": {...}}` or
/// `{"kind": "text", "data": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum InsightOutcome {
    Structured(Value),
    Text(String),
}

impl InsightOutcome {
    pub fn as_structured(&self) -> Option<&Value> {
        match self {
            Self::Structured(v) => Some(v),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Structured(_) => None,
            Self::Text(t) => Some(t),
        }
    }

    /// Typed view of a structured outcome. `None` for text outcomes or
    /// when the model's object does not fit `T`.
    pub fn structured_as<T: for<'de> Deserialize<'de>>(&self) -> Option<T> {
        self.as_structured()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

// ═══════════════════════════════════════════════════════════
// Structured shapes
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Emergency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossibleCondition {
    pub name: String,
    /// 0–100
    pub probability: u8,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymptomAnalysis {
    pub possible_conditions: Vec<PossibleCondition>,
    pub urgency: Urgency,
    pub recommendations: Vec<String>,
    pub red_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Worsening,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalTrend {
    pub metric: String,
    pub direction: TrendDirection,
    pub insight: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthTrendAnalysis {
    pub summary: String,
    pub trends: Vec<VitalTrend>,
    pub recommendations: Vec<String>,
    pub concerns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalDecisionSupport {
    pub assessment: String,
    pub differential_diagnoses: Vec<PossibleCondition>,
    pub recommended_tests: Vec<String>,
    pub recommendations: Vec<String>,
    pub urgency: Urgency,
    pub red_flags: Vec<String>,
}
