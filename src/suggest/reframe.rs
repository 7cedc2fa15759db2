//! VOID-scene reframing: turn a charged sentence into a neutral observation.

use std::sync::LazyLock;

use regex::Regex;

/// Returned when nothing observable is left after stripping.
pub const NEUTRAL_OBSERVATION: &str = "I notice something is present.";

const PREFIX: &str = "I notice";

// Contractions come before their stems so "shouldn't" is removed whole.
static EMOTIONAL_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(terrible|awful|amazing|great|horrible|wonderful|stupid|brilliant|bad|good|worst|best|hate|love|disgusting|beautiful)\b",
    )
    .expect("valid emotional word pattern")
});

static JUDGMENT_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(shouldn't|should|must|can't|never|always|impossible|perfect|failure|success)\b",
    )
    .expect("valid judgment word pattern")
});

/// Strip emotional and absolutist words and phrase the rest as "I notice ...".
///
/// Idempotent: text that already reads "I notice ..." keeps a single prefix.
pub fn reframe(text: &str) -> String {
    let stripped = EMOTIONAL_WORDS.replace_all(text, "");
    let stripped = JUDGMENT_WORDS.replace_all(&stripped, "");
    let body = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    let body = match body.strip_prefix("i notice") {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => rest.trim_start().to_string(),
        _ => body,
    };

    if body.is_empty() {
        NEUTRAL_OBSERVATION.to_string()
    } else {
        format!("{PREFIX} {body}")
    }
}
