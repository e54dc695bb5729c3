//! CV-vs-job analysis workflow.
//!
//! A fixed directed chain of dependent steps (skill extraction, requirement
//! extraction, deterministic overlap scoring, recommendation generation,
//! quality self-evaluation) driven by an explicit state machine, tolerating
//! malformed model output at every step and degrading to a well-shaped
//! result on total failure.

pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod state;
pub mod steps;
pub mod workflow;

/// Char-boundary-safe prefix of at most `max` characters.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_short_input_untouched() {
        assert_eq!(truncate_chars("hola", 10), "hola");
    }

    #[test]
    fn test_truncate_chars_cuts_at_limit() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }

    #[test]
    fn test_truncate_chars_respects_multibyte_boundaries() {
        // 'ñ' is two bytes; a byte slice at 3 would panic
        assert_eq!(truncate_chars("añadir", 2), "añ");
    }
}
