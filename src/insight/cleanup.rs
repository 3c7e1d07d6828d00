//! Prose cleanup for text-mode answers.
//!
//! Strips markdown emphasis and heading markers and collapses blank-line
//! runs. `clean_prose(clean_prose(x)) == clean_prose(x)` for every input.

use std::sync::LazyLock;

use regex::Regex;

static HEADING_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[^\S\n]*(?:#+[^\S\n]*)+").expect("valid regex"));

static BLANK_LINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[^\S\n]*\n){2,}").expect("valid regex"));

/// Clean free-form model output for display.
///
/// Line-leading whitespace is matched with the same Unicode class that the
/// final `trim` strips.
pub fn clean_prose(raw: &str) -> String {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");

    // Emphasis: *, **, ***, and __
    let text = text.replace('*', "").replace("__", "");

    let text = HEADING_MARKERS.replace_all(&text, "");
    let text = BLANK_LINE_RUN.replace_all(&text, "\n\n");

    text.trim().to_string()
}
