use log::{debug, info, warn};

use crate::chat::client::{CompletionClient, CompletionRequest};
use crate::chat::prompts::{EXTRACT, SYSTEM_PROMPT};
use crate::chat::response::parse_document;
use crate::error::{Error, Result};
use crate::models::resume::ResumeDocument;

/// Where a single-shot model adapter is in its one request.
///
/// An upstream failure leaves the adapter in `RequestSent`; only a response
/// that came back and could not be used moves it to `ParseFailed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Built,
    RequestSent,
    ParsedOk,
    ParseFailed,
}

/// Sends `request` and moves `state` along with the outcome of `parse`.
pub(crate) async fn exchange<C, T>(
    client: &C,
    request: CompletionRequest,
    state: &mut AdapterState,
    parse: impl FnOnce(&str) -> Result<T>,
) -> Result<T>
where
    C: CompletionClient,
{
    *state = AdapterState::RequestSent;
    let raw = client.complete(&request).await?;

    match parse(&raw) {
        Ok(parsed) => {
            *state = AdapterState::ParsedOk;
            Ok(parsed)
        }
        Err(e) => {
            *state = AdapterState::ParseFailed;
            warn!("model response rejected: {}", e);
            Err(e)
        }
    }
}

/// Turns free resume text into a validated [`ResumeDocument`].
#[derive(Debug)]
pub struct ResumeExtractor {
    text: String,
    state: AdapterState,
}

impl ResumeExtractor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            state: AdapterState::Built,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub async fn run<C: CompletionClient>(&mut self, client: &C) -> Result<ResumeDocument> {
        if self.text.trim().is_empty() {
            return Err(Error::EmptyInput("resume text is blank".to_string()));
        }

        info!("extracting structured resume with prompt {}", EXTRACT.id);
        debug!("resume text length: {}", self.text.len());

        let prompt = EXTRACT.render(&[("resume_text", self.text.as_str())]);
        let request = CompletionRequest::new(prompt)
            .system(SYSTEM_PROMPT)
            .temperature(EXTRACT.temperature)
            .json();

        exchange(client, request, &mut self.state, parse_document).await
    }
}
