use serde_json::Value;

use super::types::{InsightKind, InsightRequest};

pub const SYMPTOM_SYSTEM_PROMPT: &str = r#"
You are a medical triage assistant supporting clinicians and patients in a
healthcare portal. You suggest possible explanations for reported symptoms.
You never make a definitive diagnosis and you always advise confirmation by a
qualified healthcare professional.
Output MUST be a single valid JSON object and nothing else.
"#;

pub const HEALTH_TRENDS_SYSTEM_PROMPT: &str = r#"
You are a health data analyst reviewing a patient's vital-sign history.
Describe trends plainly, point out values that deserve attention, and suggest
practical next steps. Do not diagnose.
Output MUST be a single valid JSON object and nothing else.
"#;

pub const CLINICAL_DECISION_SYSTEM_PROMPT: &str = r#"
You are a clinical decision support assistant for licensed clinicians.
Offer a differential diagnosis, investigations, and management considerations
grounded in the case as described. The treating clinician makes every final
decision.
Output MUST be a single valid JSON object and nothing else.
"#;

pub const CASE_SUMMARY_SYSTEM_PROMPT: &str = r#"
You are a clinical documentation assistant. You write concise, accurate case
summaries for handover between care teams. Use only information present in the
case text. Do not invent findings.
"#;

pub const RADIOLOGY_SYSTEM_PROMPT: &str = r#"
You are a radiology reporting assistant. You turn a radiologist's dictated
findings into a clear structured report. Use only the findings provided and
flag anything that needs urgent clinical correlation.
"#;

/// System instruction for a kind.
pub fn system_prompt(kind: InsightKind) -> &'static str {
    match kind {
        InsightKind::SymptomAnalysis => SYMPTOM_SYSTEM_PROMPT,
        InsightKind::HealthTrends => HEALTH_TRENDS_SYSTEM_PROMPT,
        InsightKind::ClinicalDecision => CLINICAL_DECISION_SYSTEM_PROMPT,
        InsightKind::CaseSummary => CASE_SUMMARY_SYSTEM_PROMPT,
        InsightKind::RadiologyReport => RADIOLOGY_SYSTEM_PROMPT,
    }
    .trim()
}

/// Build the user instruction: payload values followed by the output-format
/// directive for the kind.
pub fn build_user_prompt(kind: InsightKind, request: &InsightRequest) -> String {
    match kind {
        InsightKind::SymptomAnalysis => build_symptom_prompt(request),
        InsightKind::HealthTrends => build_health_trends_prompt(request),
        InsightKind::ClinicalDecision => build_clinical_decision_prompt(request),
        InsightKind::CaseSummary => build_case_summary_prompt(request),
        InsightKind::RadiologyReport => build_radiology_prompt(request),
    }
}

fn build_symptom_prompt(request: &InsightRequest) -> String {
    let context = context_lines(
        request,
        &[
            ("age", "Age"),
            ("gender", "Gender"),
            ("duration", "Duration"),
            ("medicalHistory", "Medical history"),
        ],
    );
    let symptoms = field_text(request, "symptoms").unwrap_or_default();

    format!(
        r#"Analyze the following symptoms.

Symptoms: {symptoms}
{context}
Respond ONLY with JSON matching exactly this shape:

```json
{{
  "possibleConditions": [
    {{"name": "condition name", "probability": 0, "description": "one sentence"}}
  ],
  "urgency": "low | medium | high | emergency",
  "recommendations": ["recommendation"],
  "redFlags": ["warning sign that needs immediate care"]
}}
```

"probability" is an integer from 0 to 100. List at most 5 conditions, most likely first."#
    )
}

fn build_health_trends_prompt(request: &InsightRequest) -> String {
    let context = context_lines(
        request,
        &[
            ("age", "Age"),
            ("gender", "Gender"),
            ("period", "Period"),
            ("goals", "Health goals"),
        ],
    );
    let vitals = field_text(request, "vitals").unwrap_or_default();

    format!(
        r#"Analyze these vital-sign readings for trends.

Readings:
{vitals}
{context}
Respond ONLY with JSON matching exactly this shape:

```json
{{
  "summary": "two or three sentences",
  "trends": [
    {{"metric": "vital name", "direction": "improving | stable | worsening | unknown", "insight": "one sentence"}}
  ],
  "recommendations": ["recommendation"],
  "concerns": ["reading that deserves attention"]
}}
```"#
    )
}

fn build_clinical_decision_prompt(request: &InsightRequest) -> String {
    let context = context_lines(
        request,
        &[
            ("patientAge", "Patient age"),
            ("currentMedications", "Current medications"),
            ("allergies", "Allergies"),
            ("specialty", "Requesting specialty"),
        ],
    );
    let case = field_text(request, "caseDescription").unwrap_or_default();

    format!(
        r#"Provide clinical decision support for this case.

Case: {case}
{context}
Respond ONLY with JSON matching exactly this shape:

```json
{{
  "assessment": "short clinical assessment",
  "differentialDiagnoses": [
    {{"name": "diagnosis", "probability": 0, "description": "supporting rationale"}}
  ],
  "recommendedTests": ["investigation"],
  "recommendations": ["management consideration"],
  "urgency": "low | medium | high | emergency",
  "redFlags": ["finding that changes urgency"]
}}
```"#
    )
}

fn build_case_summary_prompt(request: &InsightRequest) -> String {
    let context = context_lines(
        request,
        &[("role", "Prepared by"), ("audience", "Intended reader")],
    );
    let case_text = field_text(request, "caseText").unwrap_or_default();

    format!(
        r#"Summarize the following case.

<case>
{case_text}
</case>
{context}
Respond as structured prose with these sections, each on its own line followed by its text:
Presenting Complaint
Key Findings
Assessment
Plan
Keep the whole summary under 250 words."#
    )
}

fn build_radiology_prompt(request: &InsightRequest) -> String {
    let context = context_lines(
        request,
        &[
            ("modality", "Modality"),
            ("bodyPart", "Body part"),
            ("clinicalHistory", "Clinical history"),
        ],
    );
    let findings = field_text(request, "findings").unwrap_or_default();

    format!(
        r#"Write a radiology report from these findings.

<findings>
{findings}
</findings>
{context}
Respond as structured prose with these sections, each on its own line followed by its text:
Technique
Findings
Impression
Recommendations"#
    )
}

/// Render the optional context fields that are present as `Label: value`
/// lines. Absent fields are omitted entirely.
fn context_lines(request: &InsightRequest, fields: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (key, label) in fields {
        if let Some(text) = field_text(request, key) {
            out.push_str(label);
            out.push_str(": ");
            out.push_str(&text);
            out.push('\n');
        }
    }
    out
}

/// Render one payload field as prompt text. `None` for absent, null, or
/// blank values.
pub fn field_text(request: &InsightRequest, key: &str) -> Option<String> {
    let text = render_value(request.get(key)?);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => (if *b { "yes" } else { "no" }).to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => {
            if items.iter().any(|v| v.is_object()) {
                // Series of readings: one per line
                items
                    .iter()
                    .map(render_value)
                    .filter(|s| !s.is_empty())
                    .map(|s| format!("- {s}"))
                    .collect::<Vec<_>>()
                    .join("\n")
            } else {
                items
                    .iter()
                    .map(render_value)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (k, render_value(v)))
            .filter(|(_, text)| !text.is_empty())
            .map(|(k, text)| format!("{k}: {text}"))
            .collect::<Vec<_>>()
            .join(", "),
    }
}
