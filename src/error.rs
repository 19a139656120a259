use thiserror::Error;

use crate::chat::client::CompletionError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported input type: {0} (expected .pdf or .docx)")]
    UnsupportedInputType(String),

    #[error("failed to read document {path}: {reason}")]
    DocumentRead { path: String, reason: String },

    #[error("nothing to process: {0}")]
    EmptyInput(String),

    #[error("model did not return valid JSON: {reason} (response starts with: {snippet:?})")]
    MalformedResponse { reason: String, snippet: String },

    #[error("response does not match the resume schema: {0}")]
    SchemaViolation(String),

    #[error("text-completion call failed: {0}")]
    UpstreamFailure(#[from] CompletionError),

    #[error("failed to write output: {0}")]
    RenderIo(#[from] std::io::Error),

    #[error("failed to typeset PDF: {0}")]
    Typesetting(String),

    #[error("unknown template style {0:?} (expected professional, modern or academic)")]
    InvalidTemplateStyle(String),
}

impl Error {
    pub(crate) fn malformed(reason: impl ToString, response: &str) -> Self {
        Error::MalformedResponse {
            reason: reason.to_string(),
            snippet: response.chars().take(200).collect(),
        }
    }

    pub(crate) fn document_read(path: &std::path::Path, reason: impl ToString) -> Self {
        Error::DocumentRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::Io(io) => Error::RenderIo(io),
            other => Error::RenderIo(std::io::Error::other(other)),
        }
    }
}
