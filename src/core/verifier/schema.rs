//! The structured verification JSON schema (§4.3) and its text-fallback
//! instruction/parser.

use crate::core::types::{Verdict, VerificationRecord};
use serde_json::{json, Value};

/// JSON schema passed as `response_format` on the structured (Responses)
/// path.
pub fn verification_schema() -> Value {
    json!({
        "type": "json_schema",
        "name": "verification_record",
        "schema": {
            "type": "object",
            "properties": {
                "verdict": {"type": "string", "enum": ["pass", "fail", "unsure"]},
                "confidence": {"type": "number", "minimum": 0, "maximum": 1},
                "reasons": {"type": "array", "items": {"type": "string"}},
                "issues": {"type": "array", "items": {"type": "string"}},
            },
            "required": ["verdict"],
            "additionalProperties": false,
        },
    })
}

/// Appended to the prompt on the fallback (plain `chat`) path, instructing
/// the model to emit a single-line minified JSON object matching the
/// schema above.
pub const FALLBACK_INSTRUCTION: &str = concat!(
    "Respond with exactly one line of minified JSON matching this shape ",
    r#"and nothing else: {"verdict":"pass"|"fail"|"unsure","confidence":number,"#,
    r#""reasons":[string],"issues":[string]}. Omit optional fields you have no value for."#,
);

/// Parses a verifier reply into a `VerificationRecord`, applying the
/// "no best-effort guessing" rule from §4.3: any unparseable JSON, or JSON
/// whose `verdict` is missing or not one of `pass|fail|unsure`, becomes the
/// unparseable sentinel.
pub fn parse_verification_reply(text: &str) -> VerificationRecord {
    let trimmed = text.trim();
    let value: Value = match serde_json::from_str(trimmed) {
        Ok(v) => v,
        Err(_) => match find_json_object(trimmed) {
            Some(v) => v,
            None => return VerificationRecord::unparseable(),
        },
    };
    parse_verification_value(&value)
}

fn find_json_object(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn parse_verification_value(value: &Value) -> VerificationRecord {
    let verdict = match value.get("verdict").and_then(|v| v.as_str()) {
        Some("pass") => Verdict::Pass,
        Some("fail") => Verdict::Fail,
        Some("unsure") => Verdict::Unsure,
        _ => return VerificationRecord::unparseable(),
    };
    VerificationRecord {
        verdict: Some(verdict),
        confidence: value.get("confidence").and_then(|v| v.as_f64()),
        reasons: value.get("reasons").and_then(|v| v.as_array()).map(|a| {
            a.iter().filter_map(|s| s.as_str().map(str::to_string)).collect()
        }),
        issues: value.get("issues").and_then(|v| v.as_array()).map(|a| {
            a.iter().filter_map(|s| s.as_str().map(str::to_string)).collect()
        }),
        arith: None,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let record = parse_verification_reply(r#"{"verdict":"pass","confidence":0.9}"#);
        assert!(record.is_pass());
        assert_eq!(record.confidence, Some(0.9));
    }

    #[test]
    fn parses_json_embedded_in_prose() {
        let record = parse_verification_reply("Sure thing:\n{\"verdict\":\"fail\",\"issues\":[\"off by one\"]}\nDone.");
        assert!(!record.is_pass());
        assert_eq!(record.issues, Some(vec!["off by one".to_string()]));
    }

    #[test]
    fn unknown_verdict_is_unparseable() {
        let record = parse_verification_reply(r#"{"verdict":"maybe"}"#);
        assert_eq!(record.error.as_deref(), Some("verification_output_unparseable"));
    }

    #[test]
    fn garbage_text_is_unparseable() {
        let record = parse_verification_reply("not json at all");
        assert_eq!(record.error.as_deref(), Some("verification_output_unparseable"));
    }

    #[test]
    fn missing_verdict_is_unparseable() {
        let record = parse_verification_reply(r#"{"confidence": 0.5}"#);
        assert_eq!(record.error.as_deref(), Some("verification_output_unparseable"));
    }
}
