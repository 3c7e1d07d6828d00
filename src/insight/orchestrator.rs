use std::sync::Arc;
use std::time::Instant;

use super::cleanup::clean_prose;
use super::client::{GenerationRequest, LlmClient};
use super::fallback::fallback_payload;
use super::parser::parse_structured_content;
use super::prompt::{build_user_prompt, field_text, system_prompt};
use super::types::{InsightKind, InsightOutcome, InsightRequest, ResponseMode};
use super::InsightError;
use crate::config::GenerationSettings;

/// Stateless proxy: one payload in, one upstream call, one normalized
/// outcome out. No retry, no cache.
pub struct InsightProxy {
    client: Arc<dyn LlmClient>,
    settings: GenerationSettings,
}

impl InsightProxy {
    pub fn new(client: Arc<dyn LlmClient>, settings: GenerationSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Run one insight call.
    ///
    /// Rejects before any network call when the kind's primary field is
    /// absent. Upstream failures come back as `Err`. Structured content
    /// that does not parse comes back as `Ok` with the fallback payload.
    pub fn get_insight(
        &self,
        kind: InsightKind,
        request: &InsightRequest,
    ) -> Result<InsightOutcome, InsightError> {
        require_primary_field(kind, request)?;

        let generation = GenerationRequest {
            model: self.settings.model.clone(),
            system: system_prompt(kind).to_string(),
            prompt: build_user_prompt(kind, request),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let start = Instant::now();
        let raw = self.client.generate(&generation).map_err(|e| {
            tracing::warn!(kind = %kind, error = %e, "Upstream generation failed");
            e
        })?;

        tracing::debug!(
            kind = %kind,
            elapsed_ms = start.elapsed().as_millis() as u64,
            response_chars = raw.len(),
            "Upstream generation completed"
        );

        Ok(normalize_response(kind, &raw))
    }
}

/// Presence check on the kind's primary field. Missing, null, blank, and
/// empty-array values are all treated as absent.
pub fn require_primary_field(
    kind: InsightKind,
    request: &InsightRequest,
) -> Result<(), InsightError> {
    let field = kind.primary_field();
    match field_text(request, field) {
        Some(_) => Ok(()),
        None => Err(InsightError::MissingField(field)),
    }
}

/// Turn raw upstream content into the outcome variant the kind expects.
pub fn normalize_response(kind: InsightKind, raw: &str) -> InsightOutcome {
    match kind.mode() {
        ResponseMode::Structured => match parse_structured_content(raw) {
            Some(value) => InsightOutcome::Structured(value),
            None => {
                // Never logs content
                tracing::warn!(
                    kind = %kind,
                    response_chars = raw.len(),
                    "Upstream content was not a JSON object, substituting fallback payload"
                );
                InsightOutcome::Structured(fallback_payload(kind).unwrap_or_default())
            }
        },
        ResponseMode::Text => InsightOutcome::Text(clean_prose(raw)),
    }
}
