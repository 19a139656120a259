use log::{debug, info};

use crate::chat::client::{CompletionClient, CompletionRequest};
use crate::chat::extractor::{AdapterState, exchange};
use crate::chat::prompts::{ENHANCE_DOCUMENT, ENHANCE_TEXT, PromptTemplate, SYSTEM_PROMPT, job_context};
use crate::chat::response::parse_document;
use crate::error::{Error, Result};
use crate::models::resume::ResumeDocument;

/// Rewrites a resume through the completion service.
///
/// The input type decides the mode: `ResumeEnhancer<String>` rewrites plain
/// text, `ResumeEnhancer<ResumeDocument>` rewrites structured data and
/// validates what comes back against the resume schema.
#[derive(Debug)]
pub struct ResumeEnhancer<I> {
    input: I,
    job_description: String,
    state: AdapterState,
}

impl<I> ResumeEnhancer<I> {
    pub fn state(&self) -> AdapterState {
        self.state
    }

    fn request(&self, template: &PromptTemplate, key: &str, value: &str) -> CompletionRequest {
        let context = job_context(&self.job_description);
        let prompt = template.render(&[("job_context", context.as_str()), (key, value)]);

        CompletionRequest::new(prompt)
            .system(SYSTEM_PROMPT)
            .temperature(template.temperature)
    }
}

impl ResumeEnhancer<String> {
    pub fn for_text(text: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            input: text.into(),
            job_description: job_description.into(),
            state: AdapterState::Built,
        }
    }

    pub async fn run_text<C: CompletionClient>(&mut self, client: &C) -> Result<String> {
        info!("enhancing resume text with prompt {}", ENHANCE_TEXT.id);
        debug!("resume text length: {}", self.input.len());

        let request = self.request(&ENHANCE_TEXT, "resume_text", &self.input);

        exchange(client, request, &mut self.state, |raw| {
            let text = raw.trim();
            if text.is_empty() {
                Err(Error::malformed("empty enhancement", raw))
            } else {
                Ok(text.to_string())
            }
        })
        .await
    }
}

impl ResumeEnhancer<ResumeDocument> {
    pub fn for_document(doc: ResumeDocument, job_description: impl Into<String>) -> Self {
        Self {
            input: doc,
            job_description: job_description.into(),
            state: AdapterState::Built,
        }
    }

    pub async fn run_document<C: CompletionClient>(
        &mut self,
        client: &C,
    ) -> Result<ResumeDocument> {
        info!("enhancing structured resume with prompt {}", ENHANCE_DOCUMENT.id);

        let json = self.input.to_json_pretty();
        let request = self
            .request(&ENHANCE_DOCUMENT, "resume_json", &json)
            .json();

        exchange(client, request, &mut self.state, parse_document).await
    }
}
