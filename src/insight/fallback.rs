use serde_json::{json, Value};

use super::types::InsightKind;

const CONSULT_PROFESSIONAL: &str =
    "Please consult a healthcare professional for a proper evaluation.";

/// Fixed payload returned in place of structured content that could not be
/// parsed. `None` for text kinds, which never fall back.
///
/// Every call returns an identical value.
pub fn fallback_payload(kind: InsightKind) -> Option<Value> {
    match kind {
        InsightKind::SymptomAnalysis => Some(json!({
            "possibleConditions": [
                {
                    "name": "Unable to analyze",
                    "probability": 0,
                    "description": "The symptoms could not be analyzed automatically."
                }
            ],
            "urgency": "medium",
            "recommendations": [
                CONSULT_PROFESSIONAL,
                "If symptoms worsen, seek medical attention promptly."
            ],
            "redFlags": [
                "Seek emergency care for chest pain, difficulty breathing, or loss of consciousness."
            ]
        })),
        InsightKind::HealthTrends => Some(json!({
            "summary": "Your health data could not be analyzed automatically at this time.",
            "trends": [],
            "recommendations": [
                "Continue recording your vital signs regularly.",
                CONSULT_PROFESSIONAL
            ],
            "concerns": []
        })),
        InsightKind::ClinicalDecision => Some(json!({
            "assessment": "Automated analysis unavailable. Clinical judgement required.",
            "differentialDiagnoses": [
                {
                    "name": "Unable to analyze",
                    "probability": 0,
                    "description": "The case could not be analyzed automatically."
                }
            ],
            "recommendedTests": [],
            "recommendations": [
                "Review the case with a senior clinician or specialist."
            ],
            "urgency": "medium",
            "redFlags": []
        })),
        InsightKind::CaseSummary | InsightKind::RadiologyReport => None,
    }
}
