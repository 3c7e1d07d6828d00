use serde_json::Value;

/// Parse upstream content that was asked to be JSON.
///
/// Accepts either bare JSON or a single fenced block (```` ```json ````).
/// Returns `None` unless the content is one JSON object; no shape checks
/// beyond that.
pub fn parse_structured_content(response: &str) -> Option<Value> {
    let candidate = strip_code_fence(response.trim());
    match serde_json::from_str::<Value>(candidate) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

/// Remove one surrounding markdown code fence, if the whole text is fenced.
fn strip_code_fence(text: &str) -> &str {
    let Some(after_open) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = after_open.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening line
    match body.find('\n') {
        Some(newline) if !body[..newline].trim_start().starts_with('{') => {
            body[newline + 1..].trim()
        }
        _ => body.trim(),
    }
}
