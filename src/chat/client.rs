//! The text-completion boundary.
//!
//! Everything that talks to a hosted model goes through [`CompletionClient`].
//! Responses are handed back as opaque strings; callers normalise and
//! validate them.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use log::{debug, info, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response carried no text content")]
    EmptyContent,
}

impl CompletionError {
    /// Wraps a reqwest error without the request URL, which can carry
    /// credentials.
    fn transport(e: reqwest::Error) -> Self {
        CompletionError::Http(e.without_url())
    }

    /// Transport failures, rate limits and server errors are worth another
    /// attempt; anything else is returned straight away.
    pub fn is_transient(&self) -> bool {
        match self {
            CompletionError::Http(e) => !e.is_decode() && !e.is_builder(),
            CompletionError::Api { status, .. } => *status == 429 || *status >= 500,
            CompletionError::EmptyContent => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub temperature: f32,
    /// Ask the service for a JSON-only response where the wire format allows it.
    pub json: bool,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.0,
            json: false,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }
}

pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, CompletionError>> + Send;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Google `generateContent`.
    #[default]
    Gemini,
    /// Any OpenAI-compatible `/chat/completions` endpoint (OpenAI, Groq, ...).
    Openai,
}

impl Provider {
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::Gemini => "https://generativelanguage.googleapis.com/v1beta/models",
            Provider::Openai => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Openai => "llama-3.3-70b-versatile",
        }
    }
}

const MAX_OUTPUT_TOKENS: u32 = 4096;

#[derive(Debug, Clone)]
pub struct HttpCompletionClient {
    client: Client,
    provider: Provider,
    api_key: String,
    model: String,
    endpoint: String,
    max_retries: usize,
    min_delay: Duration,
}

impl HttpCompletionClient {
    pub fn new(
        provider: Provider,
        api_key: String,
        model: String,
        endpoint: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            provider,
            api_key,
            model,
            endpoint,
            max_retries: 3,
            min_delay: Duration::from_secs(1),
        })
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries as usize;
        self
    }

    /// First backoff delay; later ones grow exponentially from it.
    pub fn with_min_delay(mut self, min_delay: Duration) -> Self {
        self.min_delay = min_delay;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        match self.provider {
            Provider::Gemini => format!("{}/{}:generateContent", endpoint, self.model),
            Provider::Openai => format!("{}/chat/completions", endpoint),
        }
    }

    fn body(&self, request: &CompletionRequest) -> Value {
        match self.provider {
            Provider::Gemini => {
                let mut generation = json!({
                    "temperature": request.temperature,
                    "maxOutputTokens": MAX_OUTPUT_TOKENS,
                });
                if request.json {
                    generation["responseMimeType"] = json!("application/json");
                }

                let mut body = json!({
                    "contents": [{"parts": [{"text": request.prompt}]}],
                    "generationConfig": generation,
                });
                if let Some(system) = &request.system {
                    body["systemInstruction"] = json!({"parts": [{"text": system}]});
                }
                body
            }
            Provider::Openai => {
                let mut messages = Vec::new();
                if let Some(system) = &request.system {
                    messages.push(json!({"role": "system", "content": system}));
                }
                messages.push(json!({"role": "user", "content": request.prompt}));

                let mut body = json!({
                    "model": self.model,
                    "messages": messages,
                    "temperature": request.temperature,
                    "max_tokens": MAX_OUTPUT_TOKENS,
                });
                if request.json {
                    body["response_format"] = json!({"type": "json_object"});
                }
                body
            }
        }
    }

    fn content<'a>(&self, body: &'a Value) -> Option<&'a str> {
        let pointer = match self.provider {
            Provider::Gemini => "/candidates/0/content/parts/0/text",
            Provider::Openai => "/choices/0/message/content",
        };
        body.pointer(pointer).and_then(Value::as_str)
    }

    async fn send(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let call = self.client.post(self.url()).json(&self.body(request));
        let call = match self.provider {
            Provider::Gemini => call.header("x-goog-api-key", self.api_key.as_str()),
            Provider::Openai => call.bearer_auth(&self.api_key),
        };

        let response = call.send().await.map_err(CompletionError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response.json().await.map_err(CompletionError::transport)?;
        let text = self
            .content(&body)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .ok_or(CompletionError::EmptyContent)?;

        Ok(text.to_string())
    }
}

impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        info!(
            "calling {:?} completion API (model: {}, max retries: {})",
            self.provider, self.model, self.max_retries
        );
        debug!("prompt length: {} characters", request.prompt.len());

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries);

        let text = (|| self.send(request))
            .retry(backoff)
            .when(CompletionError::is_transient)
            .notify(|e, delay| warn!("completion call failed ({}), retrying in {:?}", e, delay))
            .await?;

        debug!("response length: {} characters", text.len());
        Ok(text)
    }
}
