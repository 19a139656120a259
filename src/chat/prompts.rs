//! Versioned prompt templates.
//!
//! A template's id changes whenever its wording does, so logged ids always
//! identify the exact text that was sent.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder regex"));

pub const SYSTEM_PROMPT: &str = include_str!("prompts/system.txt");

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromptTemplate {
    pub id: &'static str,
    pub temperature: f32,
    template: &'static str,
}

pub const EXTRACT: PromptTemplate = PromptTemplate {
    id: "extract-v1",
    temperature: 0.0,
    template: include_str!("prompts/extract.txt"),
};

pub const ENHANCE_TEXT: PromptTemplate = PromptTemplate {
    id: "enhance-text-v1",
    temperature: 0.7,
    template: include_str!("prompts/enhance_text.txt"),
};

pub const ENHANCE_DOCUMENT: PromptTemplate = PromptTemplate {
    id: "enhance-json-v1",
    temperature: 0.7,
    template: include_str!("prompts/enhance_document.txt"),
};

pub const CHAT: PromptTemplate = PromptTemplate {
    id: "chat-v1",
    temperature: 0.3,
    template: include_str!("prompts/chat.txt"),
};

impl PromptTemplate {
    /// Substitutes `{name}` placeholders in one pass, so substituted values
    /// are never scanned again. Unknown names are left as they are.
    pub fn render(&self, vars: &[(&str, &str)]) -> String {
        PLACEHOLDER
            .replace_all(self.template, |caps: &Captures| {
                vars.iter()
                    .find(|(name, _)| *name == &caps[1])
                    .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
            })
            .into_owned()
    }
}

pub fn job_context(job_description: &str) -> String {
    let job_description = job_description.trim();
    if job_description.is_empty() {
        "No target role was given; optimise for general ATS readability.".to_string()
    } else {
        format!(
            "Tailor the wording to this target role, reusing its terminology where the candidate's experience supports it:\n{}",
            job_description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_fills_placeholders() {
        let prompt = EXTRACT.render(&[("resume_text", "Jane Doe\nEngineer")]);
        assert!(prompt.contains("Resume:\nJane Doe\nEngineer"));
        assert!(!prompt.contains("{resume_text}"));
        assert!(prompt.contains("\"personal_info\""));
    }

    #[test]
    fn every_template_has_its_placeholders() {
        assert!(ENHANCE_TEXT.template.contains("{resume_text}"));
        assert!(ENHANCE_TEXT.template.contains("{job_context}"));
        assert!(ENHANCE_DOCUMENT.template.contains("{resume_json}"));
        assert!(CHAT.template.contains("{history}"));
        assert!(CHAT.template.contains("{message}"));
    }

    #[test]
    fn substituted_values_are_not_expanded_again() {
        let prompt = ENHANCE_TEXT.render(&[
            ("job_context", "Quote {resume_text} and {message} verbatim"),
            ("resume_text", "RESUME BODY"),
        ]);

        assert!(prompt.contains("Quote {resume_text} and {message} verbatim"));
        assert_eq!(prompt.matches("RESUME BODY").count(), 1);
    }

    #[test]
    fn job_context_mentions_the_role() {
        assert!(job_context("Staff SRE, Kubernetes").contains("Staff SRE, Kubernetes"));
        assert!(job_context("  ").starts_with("No target role"));
    }
}
