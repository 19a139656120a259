//! ATS-aware resume builder.
//!
//! Extracts text from a PDF, DOCX or manual form, scores it against
//! heuristic applicant-tracking criteria, rewrites it through a
//! text-completion service, rescores it and renders the result as DOCX
//! and/or PDF in one of three templates.

pub mod ats;
pub mod chat;
pub mod error;
pub mod ingest;
pub mod latex;
pub mod models;
pub mod render;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
