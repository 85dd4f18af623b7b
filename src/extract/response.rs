//! Cleanup and decode of the model's response text.
//!
//! The model is told to output JSON only, but replies still come wrapped in
//! markdown code fences or padded with whitespace. Cleanup strips those;
//! anything that still fails to decode is an extraction failure — the user
//! is asked to resubmit rather than the bot attempting repair heuristics.

use crate::error::ExtractionError;
use crate::pipeline::types::CandidateRecord;

/// Strip code-fence markers and surrounding whitespace.
///
/// Idempotent: bare JSON passes through unchanged.
pub fn clean_response(raw: &str) -> String {
    raw.replace("```json", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Clean and decode the model's text into a candidate record.
pub fn decode_candidate(raw: &str) -> Result<CandidateRecord, ExtractionError> {
    let cleaned = clean_response(raw);
    let candidate = serde_json::from_str(&cleaned)?;
    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BARE: &str = r#"{"amount": 15, "category": "Food Takeout", "merchant": "Lunch", "note": ""}"#;

    #[test]
    fn fenced_and_bare_json_decode_identically() {
        let fenced = format!("```json\n{BARE}\n```");
        assert_eq!(
            decode_candidate(&fenced).unwrap(),
            decode_candidate(BARE).unwrap()
        );
    }

    #[test]
    fn cleanup_strips_fences_and_whitespace() {
        assert_eq!(clean_response("```json\n{}\n```"), "{}");
        assert_eq!(clean_response("  {}  \n"), "{}");
    }

    #[test]
    fn cleanup_is_idempotent() {
        let once = clean_response("```json\n{\"amount\": 1}\n```");
        assert_eq!(clean_response(&once), once);
    }

    #[test]
    fn closing_fence_without_language_tag() {
        let raw = "```\n{\"amount\": 2}\n```";
        let candidate = decode_candidate(raw).unwrap();
        assert_eq!(candidate.amount, Some(serde_json::json!(2)));
    }

    #[test]
    fn non_json_response_fails_to_decode() {
        assert!(decode_candidate("I couldn't read that receipt, sorry!").is_err());
    }

    #[test]
    fn decode_tolerates_missing_fields() {
        let candidate = decode_candidate(r#"{"amount": 3.5}"#).unwrap();
        assert_eq!(candidate.category, None);
        assert_eq!(candidate.merchant, None);
        assert_eq!(candidate.note, None);
    }
}
