use serde_json::{Map, Value};

use crate::types::{ModelEnvelope, PartialSections};

/// Extract a best-effort [`ModelEnvelope`] from arbitrary model output.
///
/// The model is asked for bare JSON but routinely wraps it in prose or a
/// fenced code block, so parsing degrades through three tiers: strict object
/// parse, then the first fenced block, then an empty envelope. This function
/// is total; unparseable input is a normal outcome, not an error, and the
/// normalizer's fallback policy picks up from there.
pub fn parse_model_envelope(raw: &str) -> ModelEnvelope {
    let Some(object) = parse_model_object(raw) else {
        return ModelEnvelope::default();
    };

    let raw_transcript = object
        .get("rawTranscript")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    ModelEnvelope {
        raw_transcript,
        sections: PartialSections {
            yesterday: section_list(&object, "yesterday", "y"),
            today: section_list(&object, "today", "t"),
            impediments: section_list(&object, "impediments", "i"),
        },
    }
}

fn parse_model_object(raw: &str) -> Option<Map<String, Value>> {
    if let Some(object) = parse_object(raw) {
        return Some(object);
    }
    parse_object(fenced_block(raw)?)
}

/// Strict parse: the trimmed input must be a JSON object literal.
fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Content of the first triple-backtick fence, with an optional `json`
/// language tag stripped. Requires a closing fence.
fn fenced_block(raw: &str) -> Option<&str> {
    let start = raw.find("```")?;
    let mut rest = &raw[start + 3..];
    if rest.len() >= 4 && rest.is_char_boundary(4) && rest[..4].eq_ignore_ascii_case("json") {
        rest = &rest[4..];
    }
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// Resolve one section list by canonical key, falling back to the short
/// alias. A non-array value is treated as "not provided".
fn section_list(object: &Map<String, Value>, key: &str, alias: &str) -> Option<Vec<String>> {
    let value = object.get(key).or_else(|| object.get(alias))?;
    let items = value.as_array()?;
    Some(
        items
            .iter()
            .map(coerce_string)
            .filter(|item| !item.trim().is_empty())
            .collect(),
    )
}

fn coerce_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{fenced_block, parse_model_envelope};

    #[test]
    fn bare_json_parses() {
        let envelope = parse_model_envelope(
            r#"{"rawTranscript": "fixed the bug", "yesterday": ["Fixed bug"], "today": [], "impediments": ["None"]}"#,
        );
        assert_eq!(envelope.raw_transcript.as_deref(), Some("fixed the bug"));
        assert_eq!(
            envelope.sections.yesterday.as_deref(),
            Some(&["Fixed bug".to_string()][..])
        );
        assert_eq!(envelope.sections.today.as_deref(), Some(&[][..]));
    }

    #[test]
    fn fenced_json_parses_same_as_unfenced() {
        let bare = r#"{"today": ["Ship release"]}"#;
        let fenced = format!("Here you go:\n```json\n{bare}\n```\nDone.");
        assert_eq!(parse_model_envelope(&fenced), parse_model_envelope(bare));
    }

    #[test]
    fn fence_without_language_tag() {
        let envelope = parse_model_envelope("```\n{\"y\": [\"a\"]}\n```");
        assert_eq!(
            envelope.sections.yesterday.as_deref(),
            Some(&["a".to_string()][..])
        );
    }

    #[test]
    fn prose_yields_empty_envelope() {
        let envelope = parse_model_envelope("I cannot help with that request.");
        assert_eq!(envelope.raw_transcript, None);
        assert_eq!(envelope.sections.yesterday, None);
        assert_eq!(envelope.sections.today, None);
        assert_eq!(envelope.sections.impediments, None);
    }

    #[test]
    fn empty_input_yields_empty_envelope() {
        assert_eq!(parse_model_envelope("   "), Default::default());
    }

    #[test]
    fn top_level_array_rejected() {
        let envelope = parse_model_envelope(r#"["yesterday", "today"]"#);
        assert_eq!(envelope, Default::default());
    }

    #[test]
    fn alias_keys_resolve() {
        let envelope = parse_model_envelope(r#"{"y": ["a"], "t": ["b"], "i": ["c"]}"#);
        assert_eq!(
            envelope.sections.today.as_deref(),
            Some(&["b".to_string()][..])
        );
        assert_eq!(
            envelope.sections.impediments.as_deref(),
            Some(&["c".to_string()][..])
        );
    }

    #[test]
    fn canonical_key_wins_over_alias() {
        let envelope = parse_model_envelope(r#"{"today": ["full"], "t": ["short"]}"#);
        assert_eq!(
            envelope.sections.today.as_deref(),
            Some(&["full".to_string()][..])
        );
    }

    #[test]
    fn non_array_section_is_absent() {
        let envelope = parse_model_envelope(r#"{"today": "not a list", "yesterday": ["ok"]}"#);
        assert_eq!(envelope.sections.today, None);
        assert!(envelope.sections.yesterday.is_some());
    }

    #[test]
    fn non_string_elements_are_coerced() {
        let envelope = parse_model_envelope(r#"{"today": [5, true, "x", "  "]}"#);
        assert_eq!(
            envelope.sections.today.as_deref(),
            Some(&["5".to_string(), "true".to_string(), "x".to_string()][..])
        );
    }

    #[test]
    fn blank_transcript_is_none() {
        let envelope = parse_model_envelope(r#"{"rawTranscript": "   "}"#);
        assert_eq!(envelope.raw_transcript, None);
    }

    #[test]
    fn fenced_block_requires_closing_fence() {
        assert_eq!(fenced_block("```json\n{\"a\": 1}"), None);
        assert_eq!(fenced_block("no fence here"), None);
    }

    #[test]
    fn fenced_block_strips_tag_and_whitespace() {
        assert_eq!(fenced_block("```JSON  {\"a\": 1} ```"), Some("{\"a\": 1}"));
    }
}
