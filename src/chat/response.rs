use log::debug;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::resume::ResumeDocument;

/// Strips code fences and any chatter around the outermost JSON object.
pub fn normalize_response(raw: &str) -> &str {
    let mut text = raw.trim();

    if let Some(stripped) = text.strip_prefix("```json") {
        text = stripped;
    } else if let Some(stripped) = text.strip_prefix("```") {
        text = stripped;
    }
    if let Some(stripped) = text.trim_end().strip_suffix("```") {
        text = stripped;
    }
    let text = text.trim();

    match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => text,
    }
}

/// Normalises, parses and validates a model response into a resume.
pub fn parse_document(raw: &str) -> Result<ResumeDocument> {
    let json = normalize_response(raw);
    debug!(
        "parsing model response ({} chars, {} after normalisation)",
        raw.len(),
        json.len()
    );

    let value: Value = serde_json::from_str(json).map_err(|e| Error::malformed(e, raw))?;
    ResumeDocument::from_response_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOCUMENT: &str = r#"{"personal_info": {"name": "Jane"}, "summary": "", "education": [],
        "skills": ["Rust"], "experience": [], "projects": []}"#;

    #[test]
    fn strips_json_fence() {
        assert_eq!(normalize_response("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(normalize_response("  ```\n{\"a\": 1}\n```  "), "{\"a\": 1}");
    }

    #[test]
    fn slices_out_of_surrounding_prose() {
        assert_eq!(
            normalize_response("Here you go: {\"a\": {\"b\": 2}} Hope it helps!"),
            "{\"a\": {\"b\": 2}}"
        );
    }

    #[test]
    fn drops_prose_after_the_closing_fence() {
        let raw = format!(
            "```json\n{}\n```\nLet me know if you need changes.",
            DOCUMENT
        );

        assert_eq!(normalize_response(&raw), DOCUMENT);
        assert_eq!(parse_document(&raw).unwrap().personal_info.name, "Jane");
    }

    #[test]
    fn leaves_text_without_braces_alone() {
        assert_eq!(normalize_response(" no json here "), "no json here");
    }

    #[test]
    fn fenced_document_parses() {
        let doc = parse_document(&format!("```json\n{}\n```", DOCUMENT)).unwrap();
        assert_eq!(doc.personal_info.name, "Jane");
        assert_eq!(doc.skills, vec!["Rust".to_string()]);
    }

    #[test]
    fn invalid_json_is_malformed_with_snippet() {
        let raw = "Sorry, I cannot help with that.";
        match parse_document(raw).unwrap_err() {
            Error::MalformedResponse { snippet, .. } => assert_eq!(snippet, raw),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn snippet_is_bounded() {
        let raw = "x".repeat(500);
        match parse_document(&raw).unwrap_err() {
            Error::MalformedResponse { snippet, .. } => assert_eq!(snippet.len(), 200),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn missing_key_is_schema_violation() {
        let err = parse_document(r#"{"personal_info": {}, "summary": ""}"#).unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(ref m) if m.contains("education")));
    }
}
