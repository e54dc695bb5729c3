//! Structured-response parser — extracts a JSON value from loosely formatted
//! model output (markdown fences, surrounding prose, partial JSON).

use serde::de::DeserializeOwned;
use thiserror::Error;

use super::truncate_chars;

/// Longest raw-output snippet carried in a parse failure, for diagnostics.
const SNIPPET_LEN: usize = 200;

/// Model output could not be decoded after every fallback attempt.
#[derive(Debug, Error)]
#[error("could not parse JSON from model output: {snippet}")]
pub struct ParseError {
    snippet: String,
}

impl ParseError {
    fn new(raw: &str) -> Self {
        Self {
            snippet: truncate_chars(raw, SNIPPET_LEN).to_string(),
        }
    }

    pub fn snippet(&self) -> &str {
        &self.snippet
    }
}

/// Decodes a structured value from raw model text.
///
/// Ordered attempts, first success wins:
/// 1. the full text as-is;
/// 2. the inner content of the first fenced code block;
/// 3. the greedy brace-delimited span (first `{` to last `}`, spanning
///    newlines).
///
/// Missing keys are never guessed here — callers apply their own defaults
/// when a recognized key is absent.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    if let Ok(value) = serde_json::from_str(raw.trim()) {
        return Ok(value);
    }
    if let Some(inner) = fenced_block(raw) {
        if let Ok(value) = serde_json::from_str(inner) {
            return Ok(value);
        }
    }
    if let Some(span) = brace_span(raw) {
        if let Ok(value) = serde_json::from_str(span) {
            return Ok(value);
        }
    }
    Err(ParseError::new(raw))
}

/// Inner content of the first triple-backtick fenced block, with any
/// language tag on the opening line stripped.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")? + 3;
    let rest = &raw[start..];
    let end = rest.find("```")?;
    let inner = &rest[..end];

    let inner = match inner.find('\n') {
        // Only drop the first line when it looks like a language tag
        Some(newline)
            if inner[..newline]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c.is_whitespace()) =>
        {
            &inner[newline + 1..]
        }
        _ => inner,
    };
    Some(inner.trim())
}

/// Greedy brace span: first `{` through last `}`.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct SkillsPayload {
        #[serde(default)]
        skills: Vec<String>,
    }

    fn skills(raw: &str) -> Result<SkillsPayload, ParseError> {
        parse_structured(raw)
    }

    #[test]
    fn test_parses_raw_json_object() {
        let payload = skills(r#"{"skills": ["Python", "SQL"]}"#).unwrap();
        assert_eq!(payload.skills, vec!["Python", "SQL"]);
    }

    #[test]
    fn test_fenced_block_equals_raw_object() {
        let raw = r#"{"skills": ["Python", "SQL"]}"#;
        let fenced = "```json\n{\"skills\": [\"Python\",\"SQL\"]}\n```";
        assert_eq!(skills(raw).unwrap(), skills(fenced).unwrap());
    }

    #[test]
    fn test_fenced_block_without_language_tag() {
        let fenced = "```\n{\"skills\": [\"Docker\"]}\n```";
        let payload = skills(fenced).unwrap();
        assert_eq!(payload.skills, vec!["Docker"]);
    }

    #[test]
    fn test_json_on_fence_opening_line_is_kept() {
        let fenced = "```{\"skills\": [\"Go\"]}```";
        let payload = skills(fenced).unwrap();
        assert_eq!(payload.skills, vec!["Go"]);
    }

    #[test]
    fn test_brace_span_inside_prose() {
        let raw = "Claro, aquí tienes el resultado:\n{\n  \"skills\": [\"Rust\"]\n}\nEspero que ayude.";
        let payload = skills(raw).unwrap();
        assert_eq!(payload.skills, vec!["Rust"]);
    }

    #[test]
    fn test_missing_key_defaults_at_caller() {
        let payload = skills("{}").unwrap();
        assert!(payload.skills.is_empty());
    }

    #[test]
    fn test_unparseable_output_fails_with_snippet() {
        let err = skills("I cannot answer that.").unwrap_err();
        assert_eq!(err.snippet(), "I cannot answer that.");
    }

    #[test]
    fn test_snippet_is_truncated_to_200_chars() {
        let long = "x".repeat(500);
        let err = skills(&long).unwrap_err();
        assert_eq!(err.snippet().chars().count(), 200);
    }

    #[test]
    fn test_no_braces_at_all_fails() {
        assert!(skills("skills: Python, SQL").is_err());
    }
}
